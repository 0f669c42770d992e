//! Deep merge of value trees.
//!
//! Used by the decode stage to lay the merged store over the target's current
//! state: mappings merge key by key, everything else is replaced.

use serde_json::Value;

/// Deep merge two JSON values, with `overlay` taking precedence over `base`.
///
/// - Objects are merged recursively: keys in overlay override keys in base
/// - Arrays, strings, numbers, booleans are replaced entirely
/// - If overlay is null, the base value is preserved (null means "not specified")
///
/// # Example
/// ```
/// use serde_json::json;
/// use layered_config::merge::deep_merge;
///
/// let base = json!({
///     "db": { "host": "localhost", "port": 5432 },
///     "cors": ["a.example", "b.example"]
/// });
/// let overlay = json!({
///     "db": { "host": "postgres.quick.club" },
///     "cors": "c.example"
/// });
/// let result = deep_merge(base, overlay);
/// assert_eq!(
///     result,
///     json!({ "db": { "host": "postgres.quick.club", "port": 5432 }, "cors": "c.example" })
/// );
/// ```
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged_value = if let Some(base_value) = base_map.remove(&key) {
                    deep_merge(base_value, overlay_value)
                } else {
                    overlay_value
                };
                base_map.insert(key, merged_value);
            }
            Value::Object(base_map)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_nested_objects() {
        let base = json!({
            "db": {"host": "localhost", "options": {"max_thread_count": 22}},
            "debug": true
        });
        let overlay = json!({
            "db": {"options": {"max_thread_count": "65"}}
        });
        let result = deep_merge(base, overlay);
        assert_eq!(
            result,
            json!({
                "db": {"host": "localhost", "options": {"max_thread_count": "65"}},
                "debug": true
            })
        );
    }

    #[test]
    fn test_arrays_replaced_not_merged() {
        let base = json!({"allow_origins": ["a", "b", "c"]});
        let overlay = json!({"allow_origins": ["d"]});
        assert_eq!(deep_merge(base, overlay), json!({"allow_origins": ["d"]}));
    }

    #[test]
    fn test_null_preserves_base() {
        let base = json!({"port": 8080, "db": {"user": "admin"}});
        let overlay = json!({"port": null, "db": {"user": null}});
        assert_eq!(
            deep_merge(base, overlay),
            json!({"port": 8080, "db": {"user": "admin"}})
        );
    }

    #[test]
    fn test_scalar_replaces_object() {
        let base = json!({"cors": {"allow_origins": ["a"]}});
        let overlay = json!({"cors": "disabled"});
        assert_eq!(deep_merge(base, overlay), json!({"cors": "disabled"}));
    }
}
