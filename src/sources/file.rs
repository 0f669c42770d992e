//! YAML file adapter.

use crate::error::{LoadError, LoadResult};
use crate::sources::defaults::kind_of;
use serde_json::{Map, Value};
use std::path::Path;

/// Read and parse the YAML file at `path`.
///
/// An explicitly requested file must exist and parse; there is no fallback to
/// defaults when it does not.
pub fn read_yaml_file(path: &Path) -> LoadResult<Map<String, Value>> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_yaml_str(&content, path)
}

/// Parse YAML text; `path` is only used in error reports.
pub fn parse_yaml_str(content: &str, path: &Path) -> LoadResult<Map<String, Value>> {
    if content.trim().is_empty() {
        return Ok(Map::new());
    }

    let value: Value = serde_yaml::from_str(content).map_err(|source| LoadError::FileParse {
        path: path.to_path_buf(),
        source,
    })?;

    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(LoadError::FileShape {
            path: path.to_path_buf(),
            reason: format!("top level is {}", kind_of(&other)),
        }),
    }
}
