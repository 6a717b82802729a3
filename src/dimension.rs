//! [MODULE A] Dimension lexer.
//!
//! Parses a signed real number followed by an optional unit suffix into
//! PostScript points (1/72 inch). No suffix defaults to points. `w`/`h`
//! scale against the current output width/height and are an error when the
//! relevant dimension is unset.

use crate::config::OutputConfig;
use crate::error::{Error, Result};

const PT_PER_IN: f64 = 72.0;
const PT_PER_CM: f64 = 28.3464566929133852;
const PT_PER_MM: f64 = 2.83464566929133852;

/// Parse a dimension expression (e.g. `"21cm"`, `"0.7"`, `"1w"`) into points.
pub fn parse(input: &str, cfg: &OutputConfig) -> Result<f64> {
    let input = input.trim();
    let (number_part, suffix) = split_number_and_suffix(input)?;
    let value: f64 = number_part
        .parse()
        .map_err(|_| Error::BadDimension(input.to_string()))?;

    let points = match suffix {
        "" | "pt" => value,
        "in" => value * PT_PER_IN,
        "cm" => value * PT_PER_CM,
        "mm" => value * PT_PER_MM,
        "w" => {
            let width = cfg
                .width
                .ok_or_else(|| Error::BadDimensionSuffix("w (output width unset)".to_string()))?;
            value * width
        }
        "h" => {
            let height = cfg
                .height
                .ok_or_else(|| Error::BadDimensionSuffix("h (output height unset)".to_string()))?;
            value * height
        }
        other => return Err(Error::BadDimensionSuffix(other.to_string())),
    };
    Ok(points)
}

/// Split a dimension literal into its leading signed-real prefix and trailing
/// alphabetic suffix. The suffix (if any) is returned lowercased-as-is; unit
/// matching is case-sensitive per the grammar (`pt`, `in`, `cm`, `mm`, `w`, `h`).
fn split_number_and_suffix(input: &str) -> Result<(&str, &str)> {
    let bytes = input.as_bytes();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'+' | b'-' if i == 0 => end = i + 1,
            b'0'..=b'9' => {
                seen_digit = true;
                end = i + 1;
            }
            b'.' if !seen_dot => {
                seen_dot = true;
                end = i + 1;
            }
            _ => break,
        }
    }
    if !seen_digit {
        return Err(Error::BadDimension(input.to_string()));
    }
    Ok((&input[..end], &input[end..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_points() {
        let cfg = OutputConfig::new();
        assert_eq!(parse("72", &cfg).unwrap(), 72.0);
        assert_eq!(parse("72pt", &cfg).unwrap(), 72.0);
    }

    #[test]
    fn inches_round_trip() {
        let cfg = OutputConfig::new();
        assert_eq!(parse("1in", &cfg).unwrap(), 72.0);
    }

    #[test]
    fn centimeters_round_trip() {
        let cfg = OutputConfig::new();
        let got = parse("2.54cm", &cfg).unwrap();
        assert!((got - 72.0).abs() < 1e-9);
    }

    #[test]
    fn millimeters() {
        let cfg = OutputConfig::new();
        let got = parse("10mm", &cfg).unwrap();
        assert!((got - 28.3464566929133852).abs() < 1e-9);
    }

    #[test]
    fn negative_values() {
        let cfg = OutputConfig::new();
        assert_eq!(parse("-1in", &cfg).unwrap(), -72.0);
    }

    #[test]
    fn width_relative() {
        let cfg = OutputConfig::new().with_dimensions(595.0, 842.0);
        assert_eq!(parse("1w", &cfg).unwrap(), 595.0);
        assert_eq!(parse("0.5h", &cfg).unwrap(), 421.0);
    }

    #[test]
    fn width_relative_without_width_is_error() {
        let cfg = OutputConfig::new();
        assert!(parse("1w", &cfg).is_err());
    }

    #[test]
    fn unknown_suffix_is_error() {
        let cfg = OutputConfig::new();
        assert!(parse("3zz", &cfg).is_err());
    }

    #[test]
    fn garbage_is_error() {
        let cfg = OutputConfig::new();
        assert!(parse("abc", &cfg).is_err());
    }
}
