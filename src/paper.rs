//! Paper-size registry: a lookup table by name returning (width, height) in
//! PostScript points. Spec.md §6 treats this as an external collaborator
//! with a contract; it is implemented here in full so the engine and CLIs
//! are runnable end to end.
//!
//! Lookup is case-insensitive. A handful of aliases used by the original
//! psutils paper table (`letter`/`note`, `legal`, `foolscap`) are accepted
//! alongside the ISO A-series.

use crate::error::{Error, Result};

const TABLE: &[(&str, f64, f64)] = &[
    ("a3", 841.89, 1190.55),
    ("a4", 595.28, 841.89),
    ("a5", 420.94, 595.28),
    ("a6", 297.64, 420.94),
    ("letter", 612.0, 792.0),
    ("note", 612.0, 792.0),
    ("legal", 612.0, 1008.0),
    ("tabloid", 792.0, 1224.0),
    ("ledger", 1224.0, 792.0),
    ("foolscap", 576.0, 936.0),
    ("executive", 522.0, 756.0),
    ("statement", 396.0, 612.0),
    ("folio", 612.0, 936.0),
    ("quarto", 610.0, 780.0),
    ("10x14", 720.0, 1008.0),
];

/// Look up a paper size by name, returning `(width, height)` in points.
pub fn lookup(name: &str) -> Result<(f64, f64)> {
    let needle = name.trim().to_ascii_lowercase();
    TABLE
        .iter()
        .find(|(n, _, _)| *n == needle)
        .map(|(_, w, h)| (*w, *h))
        .ok_or_else(|| Error::UnknownPaper(name.to_string()))
}
