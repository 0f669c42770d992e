//! Default-source adapter.
//!
//! The derived `Serialize` impl is the field enumeration: each field is
//! visited under its serde name (`#[serde(rename = "...")]` sets the path
//! segment) and nested structs recurse into compound keys.

use crate::error::{LoadError, LoadResult};
use serde::Serialize;
use serde_json::{Map, Value};

/// Serialize `defaults` into a nested mapping ready for the store.
///
/// Fails with a schema error when the value is not a structure, cannot be
/// serialized, or uses a field name containing the delimiter.
pub fn collect_defaults<T>(defaults: &T, delimiter: &str) -> LoadResult<Map<String, Value>>
where
    T: Serialize + ?Sized,
{
    let value = serde_json::to_value(defaults).map_err(|e| LoadError::schema(e.to_string()))?;

    let map = match value {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            return Err(LoadError::schema(format!(
                "defaults must serialize to a structure, got {}",
                kind_of(&other)
            )));
        }
    };

    check_names(&map, delimiter, "")?;
    Ok(map)
}

fn check_names(map: &Map<String, Value>, delimiter: &str, parent: &str) -> LoadResult<()> {
    for (name, value) in map {
        let path = if parent.is_empty() {
            name.clone()
        } else {
            format!("{}{}{}", parent, delimiter, name)
        };
        if name.is_empty() {
            return Err(LoadError::schema(format!("empty field name under `{}`", parent)));
        }
        if name.contains(delimiter) {
            return Err(LoadError::schema(format!(
                "field name `{}` contains the delimiter `{}`",
                path, delimiter
            )));
        }
        if let Value::Object(nested) = value {
            check_names(nested, delimiter, &path)?;
        }
    }
    Ok(())
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use serde_json::json;
    use std::collections::HashMap;

    #[derive(Serialize)]
    struct Options {
        #[serde(rename = "max_thread_count")]
        threads: u32,
    }

    #[derive(Serialize)]
    struct Db {
        host: String,
        options: Options,
    }

    #[derive(Serialize)]
    struct Root {
        debug: bool,
        db: Db,
    }

    #[test]
    fn test_nested_struct_uses_serde_names() {
        let root = Root {
            debug: true,
            db: Db {
                host: "localhost".into(),
                options: Options { threads: 22 },
            },
        };
        let map = collect_defaults(&root, ".").unwrap();
        assert_eq!(
            Value::Object(map),
            json!({"debug": true, "db": {"host": "localhost", "options": {"max_thread_count": 22}}})
        );
    }

    #[test]
    fn test_scalar_defaults_rejected() {
        let err = collect_defaults(&42u8, ".").unwrap_err();
        assert_eq!(err.code(), ErrorCode::SchemaError);
    }

    #[test]
    fn test_delimiter_in_field_name_rejected() {
        let mut labels = HashMap::new();
        labels.insert("team.name".to_string(), "core".to_string());
        let err = collect_defaults(&json!({"labels": labels}), ".").unwrap_err();
        assert_eq!(err.code(), ErrorCode::SchemaError);
        assert!(err.to_string().contains("labels.team.name"));
    }

    #[test]
    fn test_non_string_map_keys_rejected() {
        let mut ports = HashMap::new();
        ports.insert((1u8, 2u8), 80u16);
        let err = collect_defaults(&ports, ".").unwrap_err();
        assert_eq!(err.code(), ErrorCode::SchemaError);
    }
}
