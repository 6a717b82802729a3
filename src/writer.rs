//! [MODULE D] Output writer.
//!
//! A thin, byte-counted wrapper around any [`Write`] sink, plus the
//! line-filtered copy primitives the imposition engine builds pages from.
//! Copies always proceed one line at a time so that a line's start offset
//! (as recorded by the scanner) is the unit the engine reasons about.

use std::io::{Read, Seek, SeekFrom, Write};

use crate::error::{Error, Result};
use crate::lineio::read_line;

/// Byte-counted wrapper around an output sink.
pub struct Writer<W: Write> {
    inner: W,
    bytes_written: u64,
}

impl<W: Write> Writer<W> {
    pub fn new(inner: W) -> Self {
        Writer {
            inner,
            bytes_written: 0,
        }
    }

    /// Total bytes written so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Write raw bytes, counting them.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner
            .write_all(bytes)
            .map_err(|e| Error::io_context("writing output", e))?;
        self.bytes_written += bytes.len() as u64;
        Ok(())
    }

    /// Write a string, counting its bytes.
    pub fn write_str(&mut self, s: &str) -> Result<()> {
        self.write_bytes(s.as_bytes())
    }

    /// Copy `[start, end)` from `input` verbatim.
    pub fn copy_range<R: Read + Seek>(&mut self, input: &mut R, start: u64, end: u64) -> Result<()> {
        self.copy_range_filtered(input, start, end, &[])
    }

    /// Copy `[start, end)` from `input` line by line, dropping any line whose
    /// starting offset appears in `ignored_offsets`. Used to drop the
    /// document's original `%%BoundingBox`/`%%DocumentMedia` header lines
    /// when the caller supplies replacements of its own.
    pub fn copy_range_filtered<R: Read + Seek>(
        &mut self,
        input: &mut R,
        start: u64,
        end: u64,
        ignored_offsets: &[u64],
    ) -> Result<()> {
        input
            .seek(SeekFrom::Start(start))
            .map_err(|e| Error::io_context("seeking input for copy", e))?;
        let mut pos = start;
        while pos < end {
            let line_start = pos;
            match read_line(input, "copying output range")? {
                Some(line) => {
                    pos += line.len() as u64;
                    if pos > end {
                        // The line straddles `end`; only the requested
                        // prefix belongs to this range.
                        let keep = (end - line_start) as usize;
                        if !ignored_offsets.contains(&line_start) {
                            self.write_bytes(&line[..keep])?;
                        }
                        break;
                    }
                    if !ignored_offsets.contains(&line_start) {
                        self.write_bytes(&line)?;
                    }
                }
                None => break,
            }
        }
        Ok(())
    }

    /// Copy lines from `start` up to (but not including) `end`, stopping
    /// early at the first line that starts with `prefix`. Returns the
    /// offset of that line (or `end`, if the prefix never occurs before
    /// `end`), leaving `input` positioned at the returned offset.
    ///
    /// Used to copy a page's setup section up to its `PStoPSxform` restore
    /// line, which the engine emits itself rather than copying verbatim.
    pub fn copy_until_line_prefix<R: Read + Seek>(
        &mut self,
        input: &mut R,
        start: u64,
        end: u64,
        prefix: &str,
    ) -> Result<u64> {
        input
            .seek(SeekFrom::Start(start))
            .map_err(|e| Error::io_context("seeking input for copy", e))?;
        let mut pos = start;
        while pos < end {
            let line_start = pos;
            match read_line(input, "copying page setup")? {
                Some(line) => {
                    if line.starts_with(prefix.as_bytes()) {
                        input
                            .seek(SeekFrom::Start(line_start))
                            .map_err(|e| Error::io_context("rewinding to matched line", e))?;
                        return Ok(line_start);
                    }
                    pos += line.len() as u64;
                    if pos > end {
                        let keep = (end - line_start) as usize;
                        self.write_bytes(&line[..keep])?;
                        break;
                    }
                    self.write_bytes(&line)?;
                }
                None => break,
            }
        }
        Ok(end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn copies_exact_range() {
        let data = b"0123456789".to_vec();
        let mut input = Cursor::new(data);
        let mut out = Writer::new(Vec::new());
        out.copy_range(&mut input, 2, 5).unwrap();
        assert_eq!(out.inner, b"234");
        assert_eq!(out.bytes_written(), 3);
    }

    #[test]
    fn filters_ignored_lines() {
        let data = b"keep1\nDROP\nkeep2\n".to_vec();
        let drop_offset = "keep1\n".len() as u64;
        let mut input = Cursor::new(data.clone());
        let mut out = Writer::new(Vec::new());
        out.copy_range_filtered(&mut input, 0, data.len() as u64, &[drop_offset])
            .unwrap();
        assert_eq!(out.inner, b"keep1\nkeep2\n");
    }

    #[test]
    fn stops_at_prefix_and_rewinds_input() {
        let data = b"a\nb\nPStoPSxform restore\nc\n".to_vec();
        let xform_offset = "a\nb\n".len() as u64;
        let mut input = Cursor::new(data.clone());
        let mut out = Writer::new(Vec::new());
        let stopped_at = out
            .copy_until_line_prefix(&mut input, 0, data.len() as u64, "PStoPSxform")
            .unwrap();
        assert_eq!(stopped_at, xform_offset);
        assert_eq!(out.inner, b"a\nb\n");
        assert_eq!(input.stream_position().unwrap(), xform_offset);
    }

    #[test]
    fn prefix_absent_copies_whole_range() {
        let data = b"a\nb\nc\n".to_vec();
        let mut input = Cursor::new(data.clone());
        let mut out = Writer::new(Vec::new());
        let stopped_at = out
            .copy_until_line_prefix(&mut input, 0, data.len() as u64, "NOPE")
            .unwrap();
        assert_eq!(stopped_at, data.len() as u64);
        assert_eq!(out.inner, data);
    }

    #[test]
    fn truncates_line_straddling_end() {
        let data = b"0123456789\n".to_vec();
        let mut input = Cursor::new(data);
        let mut out = Writer::new(Vec::new());
        out.copy_range(&mut input, 0, 5).unwrap();
        assert_eq!(out.inner, b"01234");
    }
}
