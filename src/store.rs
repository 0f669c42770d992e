//! Flat key/value store shared by all loading stages.
//!
//! Keys are dotted paths (`db.options.max_thread_count`) joined with the
//! configured delimiter. Each stage writes into the same store and the last
//! write for a key wins.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Source layer a value came from (lowest to highest precedence).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    /// Defaults supplied by the caller (lowest priority)
    Defaults = 0,
    /// YAML file
    File = 1,
    /// Environment variables (highest priority)
    Environment = 2,
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Layer::Defaults => write!(f, "defaults"),
            Layer::File => write!(f, "file"),
            Layer::Environment => write!(f, "environment"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    value: Value,
    layer: Layer,
}

/// Sorted mapping from dotted key to untyped value, with provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct LayeredStore {
    delimiter: String,
    entries: BTreeMap<String, Entry>,
}

impl LayeredStore {
    pub fn new(delimiter: impl Into<String>) -> Self {
        Self {
            delimiter: delimiter.into(),
            entries: BTreeMap::new(),
        }
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// Set `key`, replacing whatever previously occupied its path.
    ///
    /// Writing `db` drops `db.host` and friends; writing `db.host` drops a
    /// scalar stored at `db`. The store therefore always unflattens into a
    /// well-formed tree.
    pub fn set(&mut self, key: impl Into<String>, value: Value, layer: Layer) {
        let key = key.into();
        if self.delimiter.is_empty() {
            self.entries.insert(key, Entry { value, layer });
            return;
        }

        let child_prefix = format!("{}{}", key, self.delimiter);
        let children: Vec<String> = self
            .entries
            .range(child_prefix.clone()..)
            .take_while(|(k, _)| k.starts_with(&child_prefix))
            .map(|(k, _)| k.clone())
            .collect();
        for child in children {
            self.entries.remove(&child);
        }

        let mut end = 0;
        while let Some(pos) = key[end..].find(&self.delimiter) {
            let ancestor = &key[..end + pos];
            self.entries.remove(ancestor);
            end += pos + self.delimiter.len();
        }

        self.entries.insert(key, Entry { value, layer });
    }

    /// Flatten a nested mapping into dotted keys and write each leaf.
    ///
    /// Sequences and scalars are leaves. Empty mappings are kept as leaves so
    /// an explicitly empty section survives the round trip.
    pub fn merge_tree(&mut self, tree: &Map<String, Value>, layer: Layer) {
        self.merge_under("", tree, layer);
    }

    fn merge_under(&mut self, prefix: &str, tree: &Map<String, Value>, layer: Layer) {
        for (name, value) in tree {
            let key = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{}{}{}", prefix, self.delimiter, name)
            };
            match value {
                Value::Object(nested) if !nested.is_empty() => {
                    self.merge_under(&key, nested, layer)
                }
                other => self.set(key, other.clone(), layer),
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key).map(|e| &e.value)
    }

    /// Which layer last wrote `key`.
    pub fn layer_of(&self, key: &str) -> Option<Layer> {
        self.entries.get(key).map(|e| e.layer)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterate `(key, value, layer)` in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value, Layer)> {
        self.entries
            .iter()
            .map(|(k, e)| (k.as_str(), &e.value, e.layer))
    }

    /// Rebuild the nested tree the dotted keys describe.
    pub fn to_tree(&self) -> Value {
        let mut root = Map::new();
        for (key, entry) in &self.entries {
            let segments: Vec<&str> = key.split(self.delimiter.as_str()).collect();
            insert_path(&mut root, &segments, entry.value.clone());
        }
        Value::Object(root)
    }
}

fn insert_path(map: &mut Map<String, Value>, segments: &[&str], value: Value) {
    match segments {
        [] => {}
        [last] => {
            map.insert((*last).to_string(), value);
        }
        [head, rest @ ..] => {
            let slot = map
                .entry((*head).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            if let Value::Object(nested) = slot {
                insert_path(nested, rest, value);
            }
        }
    }
}
