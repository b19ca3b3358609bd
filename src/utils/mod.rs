//! Utility functions and helpers.

pub mod fs;
pub mod http;

use serde_json::Value;

/// Read a catalog value as a finite number.
///
/// The catalog sends prices both as JSON numbers and as numeric strings
/// (decimal columns serialize as text). Anything else, including NaN or
/// infinite results, is treated as absent.
pub fn parse_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Read a catalog value as display text.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Round to two decimal places (currency cents).
pub fn round_cents(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
