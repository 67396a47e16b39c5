//! Numeric text helpers.
//!
//! Source tables arrive as display-formatted text: thousands separators,
//! percent signs and currency symbols are common. These helpers turn such
//! text into `f64` values and back into a stable textual form for output.

/// Formats a floating-point number as a string without trailing zeros.
///
/// Integral values print without a decimal point and negative zero prints
/// as `0`.
///
/// # Examples
///
/// ```
/// use coop_common::format_numeric;
///
/// assert_eq!(format_numeric(1.0), "1");
/// assert_eq!(format_numeric(10.0), "10");
/// assert_eq!(format_numeric(1.50), "1.5");
/// assert_eq!(format_numeric(-0.0), "0");
/// ```
pub fn format_numeric(v: f64) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    let s = format!("{v}");
    if !s.contains('.') {
        return s;
    }
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Parses a string as a finite `f64`, returning `None` for invalid or empty strings.
///
/// `NaN` and infinities are rejected so that they never enter a numeric column.
pub fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|parsed| parsed.is_finite())
}

/// Returns true for the currency symbols that appear in source sheets.
pub fn is_currency_symbol(ch: char) -> bool {
    matches!(ch, '$' | '€' | '£' | '¥')
}

/// Removes percent signs, thousands separators and currency symbols.
///
/// The result is trimmed; it is not guaranteed to be numeric.
///
/// # Examples
///
/// ```
/// use coop_common::strip_numeric_decorations;
///
/// assert_eq!(strip_numeric_decorations(" $1,250.5 "), "1250.5");
/// assert_eq!(strip_numeric_decorations("12.5%"), "12.5");
/// assert_eq!(strip_numeric_decorations("n/a"), "n/a");
/// ```
pub fn strip_numeric_decorations(value: &str) -> String {
    value
        .chars()
        .filter(|ch| *ch != '%' && *ch != ',' && !is_currency_symbol(*ch))
        .collect::<String>()
        .trim()
        .to_string()
}
