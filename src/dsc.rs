//! [MODULE B] DSC scanner.
//!
//! Builds an index of section offsets and per-page start offsets by reading
//! a DSC-conformant PostScript file once, forward, line by line. The
//! scanner trusts the document: mismatched `%%Begin*`/`%%End*` nesting is
//! not diagnosed (spec.md §9 Open Questions).

use std::io::{Read, Seek, SeekFrom};

use crate::error::{Error, Result};
use crate::lineio::read_line;

/// Immutable index over a DSC-conformant PostScript file, produced once by
/// [`scan`] and consumed by the imposition engine. Per the design note in
/// spec.md §9, this value externalizes what the original tool keeps in
/// module-global state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DscIndex {
    /// First byte after the header-comment block.
    pub header_end: u64,
    /// Offset of the `%%Pages:` line in the header, or 0 if absent.
    pub pages_comment: u64,
    /// Offset of the line after `%%EndSetup`, or the first page if absent.
    pub end_setup: u64,
    /// Offset delimiting an embedded `PStoPS` procset, or 0 if absent.
    pub begin_procset: u64,
    /// Offset after an embedded `PStoPS` procset's `%%EndProcSet`, or 0.
    pub end_procset: u64,
    /// `page_offsets[i]` is the offset of page `i`'s `%%Page:` line;
    /// `page_offsets[pages]` is the offset of the trailer (one past the
    /// last page body). Length is always `pages() + 1`.
    pub page_offsets: Vec<u64>,
    /// Offsets of `%%BoundingBox`/`%%HiResBoundingBox`/`%%DocumentPaperSizes`/
    /// `%%DocumentMedia` header lines, in the order encountered. Unlike the
    /// C original's sentinel-terminated array, a `Vec`'s length already
    /// marks the end.
    pub size_headers: Vec<u64>,
}

impl DscIndex {
    /// Number of `%%Page:` markers found.
    pub fn pages(&self) -> usize {
        self.page_offsets.len().saturating_sub(1)
    }
}

/// Read one line (including its terminating `\n`, if any) starting at the
/// stream's current position, returning the line's starting offset and its
/// raw bytes. Returns `None` at EOF with nothing read.
fn read_line_with_offset<R: Read + Seek>(input: &mut R) -> Result<Option<(u64, Vec<u8>)>> {
    let start = input
        .stream_position()
        .map_err(|e| Error::io_context("reading DSC stream position", e))?;
    match read_line(input, "scanning DSC comments")? {
        Some(line) => Ok(Some((start, line))),
        None => Ok(None),
    }
}

fn starts_with(line: &[u8], prefix: &str) -> bool {
    line.starts_with(prefix.as_bytes())
}

/// Build a [`DscIndex`] over `input`, which must be positioned at the start
/// of the file (or will be rewound here) and support seeking.
pub fn scan<R: Read + Seek>(input: &mut R) -> Result<DscIndex> {
    input
        .seek(SeekFrom::Start(0))
        .map_err(|e| Error::io_context("seeking to start of input", e))?;

    let mut index = DscIndex::default();
    let mut header_end: Option<u64> = None;
    let mut shebang_end: Option<u64> = None;
    let mut nesting: u32 = 0;
    let mut first_line = true;
    let mut last_offset: u64 = 0;
    let mut trailer_offset: Option<u64> = None;

    while let Some((offset, line)) = read_line_with_offset(input)? {
        last_offset = offset + line.len() as u64;

        if first_line {
            first_line = false;
            if line.first() != Some(&b'%') {
                header_end = Some(offset);
            } else {
                shebang_end = Some(last_offset);
            }
            if !starts_with(&line, "%%") {
                // The `%!...` shebang itself; header scanning continues.
                continue;
            }
        } else if header_end.is_none() && !starts_with(&line, "%%") {
            header_end = Some(offset);
        }

        if !starts_with(&line, "%%") {
            continue;
        }

        if nesting == 0 {
            if starts_with(&line, "%%Page:") {
                index.page_offsets.push(offset);
            } else if starts_with(&line, "%%Pages:") {
                if header_end.is_none() {
                    index.pages_comment = offset;
                }
            } else if starts_with(&line, "%%BoundingBox:")
                || starts_with(&line, "%%HiResBoundingBox:")
                || starts_with(&line, "%%DocumentPaperSizes:")
                || starts_with(&line, "%%DocumentMedia:")
            {
                if header_end.is_none() {
                    index.size_headers.push(offset);
                }
            } else if starts_with(&line, "%%EndComments") || starts_with(&line, "%%BeginProlog") {
                if header_end.is_none() {
                    header_end = Some(last_offset);
                }
            } else if starts_with(&line, "%%EndSetup") {
                // §3's data model defines `end_setup` as the offset *after*
                // this line, so the prologue/setup copy in the engine keeps
                // the `%%EndSetup` line itself rather than dropping it.
                index.end_setup = last_offset;
            } else if starts_with(&line, "%%BeginProcSet: PStoPS") {
                index.begin_procset = offset;
            } else if starts_with(&line, "%%Trailer") || starts_with(&line, "%%EOF") {
                trailer_offset = Some(offset);
                break;
            }
        } else if starts_with(&line, "%%EndProcSet") && index.begin_procset != 0 && index.end_procset == 0
        {
            index.end_procset = last_offset;
        }

        if starts_with(&line, "%%BeginDocument")
            || starts_with(&line, "%%BeginBinary")
            || starts_with(&line, "%%BeginFile")
        {
            nesting += 1;
        } else if nesting > 0
            && (starts_with(&line, "%%EndDocument")
                || starts_with(&line, "%%EndBinary")
                || starts_with(&line, "%%EndFile"))
        {
            nesting -= 1;
        }

        // header_end may still be unset once we reach the first page: fall
        // back to "after the %! line" per spec.md §3.
        if header_end.is_none() && !index.page_offsets.is_empty() {
            header_end = shebang_end.or(Some(offset));
        }
    }

    index.header_end = header_end.unwrap_or(last_offset);

    let trailer = trailer_offset.unwrap_or(last_offset);
    if let Some(seek_back) = trailer_offset {
        input
            .seek(SeekFrom::Start(seek_back))
            .map_err(|e| Error::io_context("seeking back to trailer", e))?;
    }
    index.page_offsets.push(trailer);

    if index.pages() > 0 {
        let first_page = index.page_offsets[0];
        if index.end_setup == 0 || index.end_setup > first_page {
            index.end_setup = first_page;
        }
    }

    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn scan_str(s: &str) -> DscIndex {
        let mut cursor = Cursor::new(s.as_bytes().to_vec());
        scan(&mut cursor).unwrap()
    }

    #[test]
    fn finds_pages_and_trailer() {
        let doc = "%!PS-Adobe-3.0\n\
                    %%Pages: 2\n\
                    %%EndComments\n\
                    %%Page: 1 1\n\
                    body1\n\
                    %%Page: 2 2\n\
                    body2\n\
                    %%Trailer\n\
                    %%EOF\n";
        let idx = scan_str(doc);
        assert_eq!(idx.pages(), 2);
        assert_eq!(idx.page_offsets.len(), 3);
        assert!(idx.pages_comment > 0);
    }

    #[test]
    fn header_end_after_end_comments() {
        let doc = "%!PS-Adobe-3.0\n%%Title: x\n%%EndComments\nsetup\n%%Page: 1 1\nbody\n%%EOF\n";
        let idx = scan_str(doc);
        let after_end_comments = "%!PS-Adobe-3.0\n%%Title: x\n%%EndComments\n".len() as u64;
        assert_eq!(idx.header_end, after_end_comments);
    }

    #[test]
    fn header_end_defaults_without_end_comments() {
        let doc = "%!PS-Adobe-3.0\n%%Page: 1 1\nbody\n%%EOF\n";
        let idx = scan_str(doc);
        let after_shebang = "%!PS-Adobe-3.0\n".len() as u64;
        assert_eq!(idx.header_end, after_shebang);
    }

    #[test]
    fn collects_size_headers_only_in_header() {
        let doc = "%!PS-Adobe-3.0\n\
                    %%BoundingBox: 0 0 612 792\n\
                    %%EndComments\n\
                    %%Page: 1 1\n\
                    %%BoundingBox: 1 1 2 2\n\
                    %%EOF\n";
        let idx = scan_str(doc);
        assert_eq!(idx.size_headers.len(), 1);
    }

    #[test]
    fn nested_begin_document_is_skipped() {
        let doc = "%!PS-Adobe-3.0\n\
                    %%EndComments\n\
                    %%Page: 1 1\n\
                    %%BeginDocument: foo\n\
                    %%Page: fake fake\n\
                    %%EndDocument\n\
                    %%Page: 2 2\n\
                    %%EOF\n";
        let idx = scan_str(doc);
        assert_eq!(idx.pages(), 2);
    }

    #[test]
    fn detects_existing_procset() {
        let doc = "%!PS-Adobe-3.0\n\
                    %%EndComments\n\
                    %%BeginProlog\n\
                    %%BeginProcSet: PStoPS 1 15\n\
                    ...\n\
                    %%EndProcSet\n\
                    %%EndProlog\n\
                    %%Page: 1 1\n\
                    %%EOF\n";
        let idx = scan_str(doc);
        assert!(idx.begin_procset > 0);
        assert!(idx.end_procset > idx.begin_procset);
    }
}
