//! Crate-wide error type.
//!
//! All four fatal-error kinds from the design (argument, layout, I/O,
//! resource) are represented here. Every fallible operation in the library
//! returns [`Result`]; there is no recovery path once an `Error` surfaces —
//! callers are expected to report it and exit non-zero.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Io(#[from] io::Error),

    #[error("{context}: {source}")]
    IoContext {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("unexpected end of file while {0}")]
    UnexpectedEof(String),

    #[error("{0}")]
    Argument(String),

    #[error("unrecognized dimension suffix {0:?}")]
    BadDimensionSuffix(String),

    #[error("{0:?} is not a valid dimension")]
    BadDimension(String),

    #[error("page {pageno} is out of range for modulo {modulo}")]
    PageOutOfRange { pageno: i32, modulo: i32 },

    #[error("modulo must be positive, got {0}")]
    BadModulo(i32),

    #[error("syntax error in page specification: {0}")]
    PageSpecSyntax(String),

    #[error("unknown paper size {0:?}")]
    UnknownPaper(String),

    #[error("can't find acceptable layout for N-up")]
    LayoutInfeasible,

    #[error("out of memory")]
    OutOfMemory,

    #[error("malformed input: {0}")]
    Malformed(String),
}

impl Error {
    /// Attach a human-readable "while doing X" prefix to an I/O error, the
    /// way the design's §7 page-numbered I/O diagnostics are worded.
    pub fn io_context(context: impl Into<String>, source: io::Error) -> Self {
        Error::IoContext {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
