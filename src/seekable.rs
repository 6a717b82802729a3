//! Input-seekability wrapper.
//!
//! The scanner and engine both require a seekable input. When the source is
//! not naturally seekable (stdin, a pipe), this module spools it to a
//! scoped temporary file first — the temporary is unlinked as soon as the
//! returned handle is dropped.

use std::fs::File;
use std::io::{self, copy, Read, Seek};
use std::path::Path;

use tempfile::tempfile;

use crate::error::{Error, Result};

/// Open `path` for seekable reading, or — if `path` is `None` — spool stdin
/// to a temporary file and return that instead.
pub fn open_seekable(path: Option<&Path>) -> Result<File> {
    match path {
        Some(path) => {
            File::open(path).map_err(|e| Error::io_context(format!("opening {}", path.display()), e))
        }
        None => spool(io::stdin()),
    }
}

/// Spool an arbitrary (possibly non-seekable) reader into a temporary file
/// and return it rewound to the start, ready for random access.
pub fn spool<R: Read>(mut source: R) -> Result<File> {
    let mut tmp = tempfile().map_err(|e| Error::io_context("creating temporary file", e))?;
    copy(&mut source, &mut tmp).map_err(|e| Error::io_context("spooling input", e))?;
    tmp.seek(io::SeekFrom::Start(0))
        .map_err(|e| Error::io_context("rewinding temporary file", e))?;
    Ok(tmp)
}
