//! Engineering units and SI prefix handling.

use crate::error::{Error, Result};

/// Parse an engineering-notation value with optional SI suffix.
///
/// Supported suffixes (case-insensitive):
/// - MEG (mega, 1e6) - matched before M
/// - K (kilo, 1e3)
/// - M (milli, 1e-3)
/// - U (micro, 1e-6)
/// - N (nano, 1e-9)
///
/// No suffix means a multiplier of 1. Empty input, an unparseable numeric
/// prefix, or an unrecognized suffix fail with [`Error::InvalidValue`].
pub fn parse_value(token: &str) -> Result<f64> {
    let s = token.trim().to_uppercase();
    if s.is_empty() {
        return Err(Error::InvalidValue(token.to_string()));
    }

    // Plain number, including exponent forms like 1e-3.
    if let Ok(v) = s.parse::<f64>() {
        return Ok(v);
    }

    // Find where the numeric prefix ends; 'E' belongs to exponent forms.
    let num_end = s
        .find(|c: char| !c.is_ascii_digit() && c != '.' && c != '-' && c != '+' && c != 'E')
        .unwrap_or(s.len());

    if num_end == 0 {
        return Err(Error::InvalidValue(token.to_string()));
    }

    let (num_str, suffix) = s.split_at(num_end);
    let value: f64 = num_str
        .parse()
        .map_err(|_| Error::InvalidValue(token.to_string()))?;

    let multiplier = match suffix {
        "MEG" => 1e6,
        "K" => 1e3,
        "M" => 1e-3,
        "U" => 1e-6,
        "N" => 1e-9,
        "" => 1.0,
        _ => return Err(Error::InvalidValue(token.to_string())),
    };

    Ok(value * multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < b.abs() * 1e-12 + 1e-20
    }

    #[test]
    fn test_parse_plain_number() {
        assert_eq!(parse_value("1.5").unwrap(), 1.5);
        assert_eq!(parse_value("-2.5").unwrap(), -2.5);
        assert_eq!(parse_value("1e-3").unwrap(), 1e-3);
        assert_eq!(parse_value("0.026").unwrap(), 0.026);
    }

    #[test]
    fn test_parse_with_suffix() {
        assert!(approx_eq(parse_value("1k").unwrap(), 1e3));
        assert!(approx_eq(parse_value("4.7K").unwrap(), 4.7e3));
        assert!(approx_eq(parse_value("10u").unwrap(), 10e-6));
        assert!(approx_eq(parse_value("100n").unwrap(), 100e-9));
    }

    #[test]
    fn test_meg_matched_before_milli() {
        assert!(approx_eq(parse_value("4.7meg").unwrap(), 4.7e6));
        assert!(approx_eq(parse_value("10M").unwrap(), 10e-3));
        assert!(approx_eq(parse_value("10MEG").unwrap(), 10e6));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(parse_value(""), Err(Error::InvalidValue(_))));
        assert!(matches!(parse_value("   "), Err(Error::InvalidValue(_))));
        assert!(matches!(parse_value("abc"), Err(Error::InvalidValue(_))));
        assert!(matches!(parse_value("1x"), Err(Error::InvalidValue(_))));
    }

    #[test]
    fn test_round_trip_canonical_form() {
        // Parsing the canonical (suffix-free) rendering of a parsed value
        // reproduces the value.
        for token in ["1k", "10u", "4.7meg", "0.026", "100n"] {
            let v = parse_value(token).unwrap();
            let canonical = format!("{}", v);
            assert_eq!(parse_value(&canonical).unwrap(), v);
        }
    }
}
