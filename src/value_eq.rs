use serde_json::{Number, Value};

/// Accepts two `f64` values to compare.
///
/// Returns a bool indicating whether they're equal within a small tolerance.
/// This accounts for NaN such that `approx_eq!(f64::NAN, f64::NAN)` is `true`.
macro_rules! approx_eq {
    ($a:expr, $b:expr) => {
        float_cmp::approx_eq!(f64, $a, $b, epsilon = 1e-6, ulps = 4) || $a.is_nan() && $b.is_nan()
    };
}

/// Compares two property values to determine if they're equal.
///
/// Objects are compared key by key regardless of key order, arrays element by
/// element. Numbers compare equal across their integer and float
/// representations, so `1` and `1.0` are the same value.
pub fn value_eq(value_a: &Value, value_b: &Value) -> bool {
    match (value_a, value_b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => number_eq(a, b),
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(a, b)| value_eq(a, b))
        }
        (Value::Object(a), Value::Object(b)) => {
            if a.len() != b.len() {
                return false;
            }

            a.iter().all(|(key, a_value)| match b.get(key) {
                Some(b_value) => value_eq(a_value, b_value),
                None => false,
            })
        }
        _ => false,
    }
}

fn number_eq(a: &Number, b: &Number) -> bool {
    // Integers that fit are compared exactly, so large ids stored as numbers
    // don't collapse into each other through f64 rounding.
    if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
        return a == b;
    }

    if let (Some(a), Some(b)) = (a.as_u64(), b.as_u64()) {
        return a == b;
    }

    match (a.as_f64(), b.as_f64()) {
        (Some(a), Some(b)) => approx_eq!(a, b),
        _ => false,
    }
}
