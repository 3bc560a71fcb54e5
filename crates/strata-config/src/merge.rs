//! Layered merging of configuration documents.

use serde_json::Value;

/// Deep merge `source` into `target`, with `source` winning.
///
/// Objects merge key by key. Any other source value, arrays included,
/// replaces the target value outright. A `null` in the source is written
/// through so that [`prune_nulls`] can delete the key afterwards.
pub fn deep_merge(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target_map), Value::Object(source_map)) => {
            for (key, source_value) in source_map {
                match target_map.get_mut(&key) {
                    Some(target_value) => deep_merge(target_value, source_value),
                    None => {
                        target_map.insert(key, source_value);
                    }
                }
            }
        }
        (target, source) => {
            *target = source;
        }
    }
}

/// Remove every key whose value is exactly `null`, recursing into nested
/// objects. Arrays are left as they are.
pub fn prune_nulls(value: &mut Value) {
    if let Value::Object(map) = value {
        map.retain(|_, v| !v.is_null());
        for child in map.values_mut() {
            prune_nulls(child);
        }
    }
}
