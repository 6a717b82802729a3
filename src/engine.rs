//! [MODULE E] Imposition engine.
//!
//! Drives the scanner's index and the page-spec list through the output
//! writer: header, procset, prologue/setup, one emitted sheet per pass over
//! the spec list, trailer. This is where every other module's work gets
//! assembled into bytes.

use std::io::{Read, Seek, SeekFrom, Write};

use crate::config::OutputConfig;
use crate::dsc::DscIndex;
use crate::error::{Error, Result};
use crate::lineio::read_line;
use crate::pagespec::{PageSpec, SpecFlags};
use crate::prologue;
use crate::report::Reporter;
use crate::writer::Writer;

/// Everything the engine needs beyond the scanner's index and the spec list.
pub struct ImposeOptions {
    /// Block size for page-spec addressing.
    pub modulo: i32,
    /// Pages per specification cycle (always 1 for N-up, configurable for
    /// the general page-rearrangement tool).
    pub pps: i32,
    pub config: OutputConfig,
}

/// Emit a re-imposed PostScript document to `output`, driven by `specs`
/// evaluated against `index`'s page offsets, reading from `input`.
pub fn impose<R: Read + Seek, W: Write>(
    input: &mut R,
    index: &DscIndex,
    specs: &[PageSpec],
    opts: &ImposeOptions,
    output: W,
    reporter: &mut Reporter,
) -> Result<u64> {
    let mut out = Writer::new(output);
    let pages = index.pages() as i32;
    let modulo = opts.modulo.max(1);

    let comma_groups = count_comma_groups(specs);
    let blocks = ceil_div(pages, modulo);
    let total_output_pages = blocks * comma_groups * opts.pps.max(1);

    write_header(input, index, &mut out, total_output_pages, &opts.config)?;
    write_procset(&mut out, &opts.config)?;
    write_transform_preservation(&mut out, index)?;
    write_prologue_and_setup(input, index, &mut out)?;

    let max_page = blocks * modulo;
    let mut output_page: u32 = 0;
    let mut thispg = 0;
    while thispg < max_page {
        emit_block(
            input, index, specs, thispg, max_page, modulo, pages, &opts.config, &mut out,
            &mut output_page, reporter,
        )?;
        thispg += modulo;
    }

    write_trailer(input, index, &mut out)?;

    let total = out.bytes_written();
    reporter.bytes_written(total);
    Ok(total)
}

fn count_comma_groups(specs: &[PageSpec]) -> i32 {
    if specs.is_empty() {
        return 0;
    }
    let mut groups = 1;
    for spec in &specs[..specs.len() - 1] {
        if !spec.flags.contains(SpecFlags::ADD_NEXT) {
            groups += 1;
        }
    }
    groups
}

fn ceil_div(n: i32, d: i32) -> i32 {
    (n + d - 1) / d
}

/// Step 1: header copy up to `pages_comment`, a synthesised `%%Pages:` line,
/// then the remainder of the header up to `header_end`. Both halves drop
/// every line starting at an offset in `index.size_headers`.
fn write_header<R: Read + Seek, W: Write>(
    input: &mut R,
    index: &DscIndex,
    out: &mut Writer<W>,
    total_output_pages: i32,
    cfg: &OutputConfig,
) -> Result<()> {
    let split = if index.pages_comment > 0 {
        index.pages_comment
    } else {
        index.header_end
    };
    out.copy_range_filtered(input, 0, split, &index.size_headers)?;

    if let (Some(width), Some(height)) = (cfg.width, cfg.height) {
        out.write_str(&format!(
            "%%DocumentMedia: plain {width} {height} 0 () ()\n"
        ))?;
        out.write_str(&format!("%%BoundingBox: 0 0 {width} {height}\n"))?;
    }
    out.write_str(&format!("%%Pages: {total_output_pages} 0\n"))?;

    if index.pages_comment > 0 {
        // Skip past the original `%%Pages:` line itself (already replaced)
        // before copying the rest of the header.
        let mut pos = index.pages_comment;
        input
            .seek(SeekFrom::Start(pos))
            .map_err(|e| Error::io_context("seeking past %%Pages:", e))?;
        if let Some(line) = read_line(input, "skipping %%Pages: line")? {
            pos += line.len() as u64;
        }
        out.copy_range_filtered(input, pos, index.header_end, &index.size_headers)?;
    }

    Ok(())
}

/// Step 2: the `PStoPS` procset, verbatim.
fn write_procset<W: Write>(out: &mut Writer<W>, cfg: &OutputConfig) -> Result<()> {
    out.write_str(&prologue::procset_source(cfg.nobind))
}

/// Step 3: if the input had no procset of its own, preserve whatever
/// transform was already in effect by initialising `PStoPSxform` to the
/// inverse-composition described in spec.md §9's open question.
fn write_transform_preservation<W: Write>(out: &mut Writer<W>, index: &DscIndex) -> Result<()> {
    if index.begin_procset == 0 {
        out.write_str(
            "userdict/PStoPSxform PStoPSmatrix matrix invertmatrix PStoPSsaved matrix currentmatrix matrix concatmatrix put\n",
        )?;
    }
    Ok(())
}

/// Step 4: prologue/setup copy, splicing around any pre-existing procset.
fn write_prologue_and_setup<R: Read + Seek, W: Write>(
    input: &mut R,
    index: &DscIndex,
    out: &mut Writer<W>,
) -> Result<()> {
    if index.begin_procset > 0 && index.end_procset > index.begin_procset {
        out.copy_range(input, index.header_end, index.begin_procset)?;
        out.copy_range(input, index.end_procset, index.end_setup)?;
    } else {
        out.copy_range(input, index.header_end, index.end_setup)?;
    }
    Ok(())
}

/// Step 6: trailer copy, verbatim to EOF.
fn write_trailer<R: Read + Seek, W: Write>(
    input: &mut R,
    index: &DscIndex,
    out: &mut Writer<W>,
) -> Result<()> {
    let trailer_start = index.page_offsets[index.pages()];
    input
        .seek(SeekFrom::Start(trailer_start))
        .map_err(|e| Error::io_context("seeking to trailer", e))?;
    let mut buf = Vec::new();
    input
        .read_to_end(&mut buf)
        .map_err(|e| Error::io_context("reading trailer", e))?;
    out.write_bytes(&buf)
}

/// Parse the numeric/label pair out of a `%%Page: <label> <ordinal>` line.
/// Falls back to `(ordinal.to_string(), ordinal)` if the comment is missing
/// or malformed; the scanner trusts the document, so the engine does too.
fn read_page_label<R: Read + Seek>(input: &mut R, offset: u64, ordinal: i32) -> Result<String> {
    input
        .seek(SeekFrom::Start(offset))
        .map_err(|e| Error::io_context("seeking to page label", e))?;
    match read_line(input, "reading %%Page: comment")? {
        Some(line) => {
            let text = String::from_utf8_lossy(&line);
            let rest = text.trim_start_matches("%%Page:").trim();
            let label = rest.split_whitespace().next().unwrap_or("");
            if label.is_empty() {
                Ok(ordinal.to_string())
            } else {
                Ok(label.to_string())
            }
        }
        None => Ok(ordinal.to_string()),
    }
}

#[allow(clippy::too_many_arguments)]
fn emit_block<R: Read + Seek, W: Write>(
    input: &mut R,
    index: &DscIndex,
    specs: &[PageSpec],
    thispg: i32,
    max_page: i32,
    modulo: i32,
    pages: i32,
    cfg: &OutputConfig,
    out: &mut Writer<W>,
    output_page: &mut u32,
    reporter: &mut Reporter,
) -> Result<()> {
    let mut i = 0;
    // Whether the previous iteration's spec carried ADD_NEXT: if not (or
    // we're at the first spec of the block), this spec starts a new sheet.
    let mut starting_new_sheet = true;

    while i < specs.len() {
        let ps = &specs[i];
        let actual = if ps.flags.contains(SpecFlags::REVERSED) {
            max_page - thispg - modulo + ps.pageno
        } else {
            thispg + ps.pageno
        };

        if starting_new_sheet {
            let label = synthesize_sheet_label(specs, i, thispg, max_page, modulo, pages, input, index)?;
            *output_page += 1;
            out.write_str(&format!("%%Page: {label} {output_page}\n"))?;
        }

        out.write_str("userdict/PStoPSsaved save put\n")?;

        if ps.needs_transform() {
            write_page_transform(out, ps, cfg)?;
        }

        if ps.flags.contains(SpecFlags::ADD_NEXT) {
            out.write_str("/PStoPSenablepage false def\n")?;
        }

        if actual >= 0 && actual < pages {
            let page_start = index.page_offsets[actual as usize];
            let page_end = index.page_offsets[actual as usize + 1];
            // The original `%%Page:` comment was already consumed to build
            // this sheet's synthesized label; don't duplicate it in the body.
            input
                .seek(SeekFrom::Start(page_start))
                .map_err(|e| Error::io_context("seeking to page start", e))?;
            let setup_start = match read_line(input, "skipping %%Page: line")? {
                Some(line) => page_start + line.len() as u64,
                None => page_start,
            };
            let xform_offset = out.copy_until_line_prefix(input, setup_start, page_end, "PStoPSxform")?;
            out.write_str("PStoPSxform concat\n")?;
            // Resume after the dropped `PStoPSxform` line, if one was found.
            let body_start = if xform_offset < page_end {
                input
                    .seek(SeekFrom::Start(xform_offset))
                    .map_err(|e| Error::io_context("seeking past PStoPSxform line", e))?;
                match read_line(input, "skipping PStoPSxform line")? {
                    Some(line) => xform_offset + line.len() as u64,
                    None => xform_offset,
                }
            } else {
                xform_offset
            };
            out.copy_range(input, body_start, page_end)?;
            reporter.page(*output_page);
        } else {
            out.write_str("PStoPSxform concat showpage\n")?;
            reporter.blank(*output_page);
        }

        out.write_str("PStoPSsaved restore\n")?;

        starting_new_sheet = !ps.flags.contains(SpecFlags::ADD_NEXT);
        i += 1;
    }

    Ok(())
}

/// Compose the `(p1,p2,…)` composite label for the merge group starting at
/// index `start` in `specs`.
#[allow(clippy::too_many_arguments)]
fn synthesize_sheet_label<R: Read + Seek>(
    specs: &[PageSpec],
    start: usize,
    thispg: i32,
    max_page: i32,
    modulo: i32,
    pages: i32,
    input: &mut R,
    index: &DscIndex,
) -> Result<String> {
    let mut labels = Vec::new();
    let mut i = start;
    loop {
        let ps = &specs[i];
        let actual = if ps.flags.contains(SpecFlags::REVERSED) {
            max_page - thispg - modulo + ps.pageno
        } else {
            thispg + ps.pageno
        };
        if actual >= 0 && actual < pages {
            let offset = index.page_offsets[actual as usize];
            labels.push(read_page_label(input, offset, actual + 1)?);
        } else {
            labels.push("*".to_string());
        }
        if !ps.flags.contains(SpecFlags::ADD_NEXT) || i + 1 >= specs.len() {
            break;
        }
        i += 1;
    }
    Ok(format!("({})", labels.join(",")))
}

/// Step 5d: the fixed-order transform: `translate`, `rotate`, `hflip`,
/// `vflip`, `scale`. Per spec.md §9's open question, this order is part of
/// the visible output contract and must not be re-derived.
fn write_page_transform<W: Write>(out: &mut Writer<W>, ps: &PageSpec, cfg: &OutputConfig) -> Result<()> {
    out.write_str("PStoPSmatrix setmatrix\n")?;

    if ps.flags.contains(SpecFlags::OFFSET) {
        out.write_str(&format!("{} {} translate\n", fmt(ps.xoff), fmt(ps.yoff)))?;
    }
    if ps.flags.contains(SpecFlags::ROTATE) {
        out.write_str(&format!("{} rotate\n", ps.rotate))?;
    }
    if ps.flags.contains(SpecFlags::HFLIP) {
        let width = cfg.width.unwrap_or(0.0) * ps.scale;
        out.write_str(&format!("[-1 0 0 1 {} 0] concat\n", fmt(width)))?;
    }
    if ps.flags.contains(SpecFlags::VFLIP) {
        let height = cfg.height.unwrap_or(0.0) * ps.scale;
        out.write_str(&format!("[1 0 0 -1 0 {}] concat\n", fmt(height)))?;
    }
    out.write_str(&format!("{} dup scale\n", fmt(ps.scale)))?;

    out.write_str("userdict/PStoPSmatrix matrix currentmatrix put\n")?;

    if let (Some(width), Some(height)) = (cfg.width, cfg.height) {
        out.write_str("userdict/PStoPSclip{0 0 moveto ")?;
        out.write_str(&format!(
            "{w} 0 lineto {w} {h} lineto 0 {h} lineto closepath}}put\n",
            w = fmt(width),
            h = fmt(height)
        ))?;
        out.write_str("initclip\n")?;
        if cfg.draw > 0.0 {
            out.write_str(&format!(
                "gsave clippath 0 setgray {} setlinewidth stroke grestore\n",
                fmt(cfg.draw)
            ))?;
        }
    }

    Ok(())
}

fn fmt(value: f64) -> String {
    // PostScript tokenises numbers without trailing zeros more tersely, but
    // any numeral form is legal; this keeps integral values readable.
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
