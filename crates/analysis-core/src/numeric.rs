//! Tolerant numeric parsing for extracted financial figures.
//!
//! Language models hand back numbers in whatever shape the filing printed
//! them: "$1,234.50", "(2,000)" for negatives, "2.5M" shorthand, or plain
//! JSON numbers. Everything funnels through `parse_amount`.

use serde_json::Value;

/// Convert a loosely-typed JSON value to a float, or None when it cannot
/// be read as one.
pub fn parse_amount(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_amount_str(s),
        _ => None,
    }
}

/// Parse a textual amount: currency symbols and thousands separators are
/// stripped, parentheses mean negative, a trailing K/M/B/T scales the value.
pub fn parse_amount_str(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',')
        .collect();
    let mut s = cleaned.trim();
    if s.is_empty() {
        return None;
    }

    let negative = s.starts_with('(') && s.ends_with(')');
    if negative {
        s = s[1..s.len() - 1].trim();
    }

    let multiplier = match s.chars().last()? {
        'k' | 'K' => Some(1e3),
        'm' | 'M' => Some(1e6),
        'b' | 'B' => Some(1e9),
        't' | 'T' => Some(1e12),
        _ => None,
    };
    if multiplier.is_some() {
        s = s[..s.len() - 1].trim_end();
    }

    let value: f64 = s.parse().ok()?;
    let value = value * multiplier.unwrap_or(1.0);
    Some(if negative { -value } else { value })
}

/// Parse a user-supplied stock price. Stricter than `parse_amount_str`:
/// a plain positive float, with at most a leading currency symbol.
pub fn parse_price(raw: &str) -> Option<f64> {
    let s = raw.trim().trim_start_matches('$').trim();
    let price: f64 = s.parse().ok()?;
    (price.is_finite() && price > 0.0).then_some(price)
}
