//! PostScript document re-imposition: a DSC scanner, a page-specification
//! language, an imposition engine that rewrites a document sheet-by-sheet
//! through an injected `PStoPS` procset, and an N-up layout optimiser built
//! on top of it.
//!
//! See [`dsc`] for the scanner, [`pagespec`] for the spec language,
//! [`engine`] for the imposition engine itself, and [`nup`] for the N-up
//! grid search. [`pstops`] and [`psnup`] in `src/bin/` are thin CLI
//! frontends over this library.

pub mod config;
pub mod dimension;
pub mod dsc;
pub mod engine;
mod lineio;
pub mod nup;
pub mod pagespec;
pub mod paper;
pub mod prologue;
pub mod report;
pub mod seekable;
pub mod writer;

pub mod error;

pub use config::OutputConfig;
pub use error::{Error, Result};
