//! Utility functions and helpers

/// Calculate percentage change from an old to a new value
pub fn percent_change(old_value: f64, new_value: f64) -> f64 {
    if old_value != 0.0 {
        ((new_value - old_value) / old_value) * 100.0
    } else {
        0.0
    }
}

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Parse a numeric field that the API may send as string or number.
/// Unparseable input yields NaN so downstream rules treat it as
/// insufficient data instead of failing the whole round.
pub fn lenient_f64(raw: &serde_json::Value) -> f64 {
    match raw {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        serde_json::Value::String(s) => s.parse::<f64>().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_percent_change() {
        assert_eq!(percent_change(100.0, 111.0), 11.0);
        assert_eq!(percent_change(100.0, 95.0), -5.0);
        assert_eq!(percent_change(0.0, 42.0), 0.0);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.0010000000000000002, 6), 0.001);
        assert_eq!(round_to(-0.0004999999, 6), -0.0005);
    }

    #[test]
    fn test_lenient_f64() {
        assert_eq!(lenient_f64(&json!("0.0123")), 0.0123);
        assert_eq!(lenient_f64(&json!(12.5)), 12.5);
        assert!(lenient_f64(&json!("not-a-number")).is_nan());
        assert!(lenient_f64(&json!(null)).is_nan());
    }
}
