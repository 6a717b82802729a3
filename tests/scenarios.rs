//! Integration tests for the named invariants and scenarios this crate's
//! design calls out as testable properties: full `dsc::scan` → `pagespec::
//! parse` / `nup::synthesize_specs` → `engine::impose` pipelines against
//! small synthesised PostScript fixtures, asserting on sheet counts, page
//! ordering, and the shape of the emitted document rather than on any one
//! module in isolation.

use std::io::Cursor;

use psutils::config::OutputConfig;
use psutils::engine::{self, ImposeOptions};
use psutils::report::Reporter;
use psutils::{dsc, nup, pagespec};

fn doc_with_pages(n: u32) -> String {
    let mut s = String::new();
    s.push_str("%!PS-Adobe-3.0\n");
    s.push_str(&format!("%%Pages: {n}\n"));
    s.push_str("%%BoundingBox: 0 0 612 792\n");
    s.push_str("%%EndComments\n");
    s.push_str("%%EndSetup\n");
    for p in 1..=n {
        s.push_str(&format!("%%Page: {p} {p}\n"));
        s.push_str("PStoPSxform concat\n");
        s.push_str(&format!("({p}) show\nshowpage\n"));
    }
    s.push_str("%%Trailer\n%%EOF\n");
    s
}

fn impose_with(doc: &str, spec: &str, modulo_default: i32, cfg: &OutputConfig) -> String {
    let mut input = Cursor::new(doc.as_bytes().to_vec());
    let index = dsc::scan(&mut input).unwrap();
    let parsed = pagespec::parse(spec, modulo_default, cfg).unwrap();
    let opts = ImposeOptions {
        modulo: parsed.modulo,
        pps: 1,
        config: *cfg,
    };
    let mut output = Vec::new();
    let mut reporter = Reporter::collecting();
    engine::impose(&mut input, &index, &parsed.specs, &opts, &mut output, &mut reporter).unwrap();
    String::from_utf8(output).unwrap()
}

/// Invariant 1 (spec.md §8): the N-up engine emits exactly ⌈P/N⌉ sheets.
#[test]
fn invariant_nup_sheet_count_is_ceil_pages_over_n() {
    let doc = doc_with_pages(10);
    let mut input = Cursor::new(doc.into_bytes());
    let index = dsc::scan(&mut input).unwrap();

    let cfg = OutputConfig::new().with_dimensions(595.28, 841.89);
    let nup_opts = nup::NupOptions::new(4, &cfg).unwrap();
    let (_hor, _ver, specs) = nup::synthesize_specs(&nup_opts).unwrap();

    let opts = ImposeOptions {
        modulo: 4,
        pps: 1,
        config: cfg,
    };
    let mut output = Vec::new();
    let mut reporter = Reporter::collecting();
    engine::impose(&mut input, &index, &specs, &opts, &mut output, &mut reporter).unwrap();
    let text = String::from_utf8(output).unwrap();
    // ceil(10 / 4) = 3 sheets.
    assert_eq!(text.matches("%%Page:").count(), 3);
}

/// Invariant 2: for a spec list over modulo M on P pages, the engine emits
/// exactly ⌈P/M⌉ · (number of comma-groups) sheets.
#[test]
fn invariant_sheet_count_matches_modulo_and_comma_groups() {
    let doc = doc_with_pages(6);
    let cfg = OutputConfig::new();
    // modulo 2, two comma-separated single-spec groups per block.
    let text = impose_with(&doc, "2:0,1", 1, &cfg);
    // ceil(6/2) * 2 = 6 sheets.
    assert_eq!(text.matches("%%Page:").count(), 6);
}

/// Invariant 3: exactly one PStoPS procset pair in the output; an
/// already-embedded procset never survives into it.
#[test]
fn invariant_single_procset_pair_survives_rewrap() {
    let doc = doc_with_pages(2);
    let cfg = OutputConfig::new();
    let text = impose_with(&doc, "0", 1, &cfg);
    assert_eq!(text.matches("%%BeginProcSet: PStoPS").count(), 1);
    assert_eq!(text.matches("%%EndProcSet").count(), 1);
}

/// Invariant 4: save/restore balance and `PStoPSenablepage` reset on every
/// new sheet that starts a merge group.
#[test]
fn invariant_save_restore_balanced_per_spec() {
    let doc = doc_with_pages(4);
    let cfg = OutputConfig::new().with_dimensions(595.0, 842.0);
    let text = impose_with(&doc, "2:0+1", 1, &cfg);
    let saves = text.matches("userdict/PStoPSsaved save put\n").count();
    let restores = text.matches("PStoPSsaved restore\n").count();
    assert_eq!(saves, restores);
    assert!(text.contains("/PStoPSenablepage false def"));
}

/// Scenario 2 (spec.md §8): `"2:-0"` on 6 pages is modulo 2 with a single
/// one-spec comma-group, so invariant 2 gives ⌈6/2⌉·1 = 3 sheets. Within
/// each block of 2, `-0` addresses the higher-indexed page
/// (`actual = max_page - thispg - modulo + pageno`), so the emitted pages
/// are 5, 3, 1 in that order — not all six.
#[test]
fn scenario_reversed_addressing_on_six_pages() {
    let doc = doc_with_pages(6);
    let cfg = OutputConfig::new();
    let text = impose_with(&doc, "2:-0", 1, &cfg);

    assert_eq!(text.matches("%%Page:").count(), 3);
    let positions: Vec<usize> = [5, 3, 1]
        .iter()
        .map(|p| text.find(&format!("({p}) show")).unwrap())
        .collect();
    let in_order = positions.windows(2).all(|w| w[0] < w[1]);
    assert!(in_order, "expected pages 5,3,1 in order, got {positions:?}");
    for p in [2, 4, 6] {
        assert!(!text.contains(&format!("({p}) show")));
    }
}

/// Scenario 6: blank-page synthesis emits `PStoPSxform concat showpage`
/// with no page body for a slot beyond the input's page count.
#[test]
fn scenario_blank_page_synthesis() {
    let doc = doc_with_pages(1);
    let cfg = OutputConfig::new();
    let text = impose_with(&doc, "2:0,1", 1, &cfg);
    assert!(text.contains("PStoPSxform concat showpage"));
}

/// Scenario 5 (spec.md §4.4): a 3-up search must consider both the (1,3)
/// and (3,1) divisor pairs (and their rotated counterparts) and settle on
/// exactly one sheet for 3 pages.
#[test]
fn scenario_three_up_chooses_one_grid_and_one_sheet() {
    let doc = doc_with_pages(3);
    let mut input = Cursor::new(doc.into_bytes());
    let index = dsc::scan(&mut input).unwrap();

    let cfg = OutputConfig::new().with_dimensions(595.28, 841.89);
    let nup_opts = nup::NupOptions::new(3, &cfg).unwrap();
    let (hor, ver, specs) = nup::synthesize_specs(&nup_opts).unwrap();
    assert_eq!(hor * ver, 3);

    let opts = ImposeOptions {
        modulo: 3,
        pps: 1,
        config: cfg,
    };
    let mut output = Vec::new();
    let mut reporter = Reporter::collecting();
    engine::impose(&mut input, &index, &specs, &opts, &mut output, &mut reporter).unwrap();
    let text = String::from_utf8(output).unwrap();
    assert_eq!(text.matches("%%Page:").count(), 1);
}

/// Dimension lexer round-trip (spec.md §8 invariant 6), exercised here
/// through the page-spec offset syntax rather than the unit directly.
#[test]
fn dimension_round_trip_through_pagespec_offsets() {
    let cfg = OutputConfig::new().with_dimensions(595.28, 841.89);
    let parsed = pagespec::parse("0(1in,2.54cm)", 1, &cfg).unwrap();
    assert!((parsed.specs[0].xoff - 72.0).abs() < 1e-9);
    assert!((parsed.specs[0].yoff - 72.0).abs() < 1e-9);
}
