//! Lenient number parsing for registry fields
//!
//! Registry measurements are typed into free-text form inputs, so a stored
//! value may be `"72"`, `" 1.65"` or `"98 %"`. Parsing mirrors the browser's
//! `parseFloat`: leading whitespace is skipped and the longest numeric prefix
//! is taken. Anything without a numeric prefix is rejected, as are values that
//! do not fit a finite `f64`.

use thiserror::Error;

/// Error type for number parsing
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NumberError {
    #[error("Invalid number format: {0}")]
    ParseError(String),

    #[error("Empty value")]
    Empty,

    #[error("Non-finite value: {0}")]
    NonFinite(String),
}

/// Parse the longest numeric prefix of `s`.
///
/// ```
/// use cohort_core::parse_number;
/// assert_eq!(parse_number(" 1.65").unwrap(), 1.65);
/// assert_eq!(parse_number("98 %").unwrap(), 98.0);
/// assert!(parse_number("n/a").is_err());
/// ```
pub fn parse_number(s: &str) -> Result<f64, NumberError> {
    let t = s.trim_start();
    if t.is_empty() {
        return Err(NumberError::Empty);
    }

    let bytes = t.as_bytes();
    let len = bytes.len();
    let mut end = 0;

    if matches!(bytes[0], b'+' | b'-') {
        end = 1;
    }
    if t[end..].starts_with("Infinity") {
        return Err(NumberError::NonFinite(s.to_string()));
    }

    // Mantissa: digits with at most one decimal point
    let mut digits = 0;
    let mut seen_dot = false;
    while end < len {
        match bytes[end] {
            b'0'..=b'9' => digits += 1,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }
    if digits == 0 {
        return Err(NumberError::ParseError(s.to_string()));
    }

    // Exponent only counts when at least one digit follows it
    if end < len && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < len && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < len && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    let value: f64 = t[..end]
        .parse()
        .map_err(|_| NumberError::ParseError(s.to_string()))?;

    if value.is_finite() {
        Ok(value)
    } else {
        Err(NumberError::NonFinite(s.to_string()))
    }
}
