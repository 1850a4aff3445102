//! Typed lookups over untyped JSON.
//!
//! All helpers return `None` instead of failing: a missing key, a value of
//! the wrong type, or a non-object on the path all read as "absent".

use serde_json::Value;

/// Walk `path` through nested objects.
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |cur, key| cur.as_object()?.get(*key))
}

/// String at `path`, only when non-empty.
pub fn path_str<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    lookup(value, path)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Integer at `path`, coerced from any numeric encoding.
pub fn path_i64(value: &Value, path: &[&str]) -> Option<i64> {
    lookup(value, path).and_then(coerce_i64)
}

/// First key in `keys` holding a non-empty string.
pub fn first_str<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| path_str(value, &[key]))
}

/// First key in `keys` holding a non-zero number.
pub fn first_i64(value: &Value, keys: &[&str]) -> Option<i64> {
    keys.iter()
        .find_map(|key| path_i64(value, &[key]).filter(|n| *n != 0))
}

/// Integers pass through, floats truncate toward zero, numeric strings are
/// parsed the same way. Anything else is absent.
pub fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|u| i64::try_from(u).unwrap_or(i64::MAX)))
            .or_else(|| n.as_f64().map(truncate)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(truncate))
        }
        _ => None,
    }
}

// `as` saturates at the i64 bounds.
fn truncate(f: f64) -> i64 {
    f.trunc() as i64
}
