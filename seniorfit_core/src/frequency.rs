//! Normalization of stored exercise-frequency data.
//!
//! Older user documents stored the frequency map in several shapes: a plain
//! object of counts, counts written as strings or floats, or a list of
//! `[id, count]` pairs. Everything is coerced into a numeric map once, when
//! the document is deserialized. Entries that cannot be read as a
//! non-negative count are dropped.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// Serde hook for `User::exercise_frequency`
pub fn deserialize_frequency<'de, D>(deserializer: D) -> Result<BTreeMap<String, u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(normalize_frequency(raw))
}

/// Coerce an arbitrary JSON value into an exercise-id → count map
pub fn normalize_frequency(raw: Value) -> BTreeMap<String, u32> {
    let mut normalized = BTreeMap::new();
    let mut dropped = 0usize;

    match raw {
        Value::Object(entries) => {
            for (id, count) in entries {
                match coerce_count(&count) {
                    Some(n) if !id.is_empty() => {
                        normalized.insert(id, n);
                    }
                    _ => dropped += 1,
                }
            }
        }
        Value::Array(pairs) => {
            for pair in pairs {
                match pair.as_array().map(Vec::as_slice) {
                    Some([Value::String(id), count]) if !id.is_empty() => {
                        match coerce_count(count) {
                            Some(n) => {
                                let total = normalized.entry(id.clone()).or_insert(0u32);
                                *total = total.saturating_add(n);
                            }
                            None => dropped += 1,
                        }
                    }
                    _ => dropped += 1,
                }
            }
        }
        Value::Null => {}
        other => {
            tracing::warn!("Ignoring exercise frequency of unexpected shape: {}", other);
        }
    }

    if dropped > 0 {
        tracing::warn!("Dropped {} invalid exercise frequency entries", dropped);
    }

    normalized
}

fn coerce_count(value: &Value) -> Option<u32> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    if n.is_finite() && n >= 0.0 && n <= f64::from(u32::MAX) {
        Some(n.floor() as u32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_object() {
        let map = normalize_frequency(json!({"a": 3, "b": 1}));
        assert_eq!(map.get("a"), Some(&3));
        assert_eq!(map.get("b"), Some(&1));
    }

    #[test]
    fn test_strings_and_floats_coerced() {
        let map = normalize_frequency(json!({"a": "4", "b": 2.7}));
        assert_eq!(map.get("a"), Some(&4));
        assert_eq!(map.get("b"), Some(&2));
    }

    #[test]
    fn test_invalid_entries_dropped() {
        let map = normalize_frequency(json!({
            "ok": 1,
            "negative": -2,
            "text": "viele",
            "nested": {"count": 1},
            "missing": null
        }));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("ok"), Some(&1));
    }

    #[test]
    fn test_pair_list() {
        let map = normalize_frequency(json!([["a", 2], ["b", "5"], ["a", 1], ["broken"]]));
        assert_eq!(map.get("a"), Some(&3));
        assert_eq!(map.get("b"), Some(&5));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_repeated_pairs_saturate() {
        let map = normalize_frequency(json!([
            ["a", 4_000_000_000u64],
            ["a", 4_000_000_000u64],
            ["b", 1]
        ]));
        assert_eq!(map.get("a"), Some(&u32::MAX));
        assert_eq!(map.get("b"), Some(&1));
    }

    #[test]
    fn test_unexpected_shapes_yield_empty() {
        assert!(normalize_frequency(Value::Null).is_empty());
        assert!(normalize_frequency(json!("garbage")).is_empty());
        assert!(normalize_frequency(json!(42)).is_empty());
    }
}
