//! Shared line-at-a-time reading helper used by the DSC scanner and the
//! output writer. PostScript files are scanned and copied one line at a
//! time so that offsets always land on line boundaries.

use std::io::Read;

use crate::error::{Error, Result};

/// Read one line (including its terminating `\n`, if any) from the current
/// position. Returns `None` at EOF with nothing read.
pub(crate) fn read_line<R: Read>(input: &mut R, context: &str) -> Result<Option<Vec<u8>>> {
    let mut line = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        let n = input
            .read(&mut byte)
            .map_err(|e| Error::io_context(context.to_string(), e))?;
        if n == 0 {
            break;
        }
        line.push(byte[0]);
        if byte[0] == b'\n' {
            break;
        }
    }
    if line.is_empty() {
        Ok(None)
    } else {
        Ok(Some(line))
    }
}
