//! Output formatting for merged configuration.

use crate::store::LayeredStore;
use anyhow::Result;
use serde_json::Value;

/// Output format for the inspection CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    /// One `key = value` line per dotted key
    Keys,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "yaml" | "yml" => Some(OutputFormat::Yaml),
            "keys" | "flat" => Some(OutputFormat::Keys),
            _ => None,
        }
    }
}

/// Render a decoded configuration tree.
pub fn format_tree(value: &Value, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
        OutputFormat::Keys => {
            let mut out = String::new();
            flatten_into(&mut out, "", value);
            Ok(out)
        }
    }
}

fn flatten_into(out: &mut String, prefix: &str, value: &Value) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (name, nested) in map {
                let key = if prefix.is_empty() {
                    name.clone()
                } else {
                    format!("{}.{}", prefix, name)
                };
                flatten_into(out, &key, nested);
            }
        }
        other if !prefix.is_empty() => {
            out.push_str(&format!("{} = {}\n", prefix, other));
        }
        _ => {}
    }
}

/// Render the store as `key = value` lines, optionally noting each key's layer.
pub fn format_store(store: &LayeredStore, explain: bool) -> String {
    let mut out = String::new();
    for (key, value, layer) in store.iter() {
        if explain {
            out.push_str(&format!("{} = {}  # {}\n", key, value, layer));
        } else {
            out.push_str(&format!("{} = {}\n", key, value));
        }
    }
    out
}
