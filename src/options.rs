//! Options controlling a single `load` call.

use crate::error::{LoadError, LoadResult};
use crate::sources::env::KeyTransform;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

pub const DEFAULT_DELIMITER: &str = ".";
pub const DEFAULT_SEPARATOR: &str = "__";

/// Caller-supplied loader configuration.
///
/// ```
/// use layered_config::LoadOptions;
///
/// let options = LoadOptions::new("QUICK_")
///     .with_yaml_file("deploy/chat/config.yml");
/// assert_eq!(options.delimiter, ".");
/// assert_eq!(options.separator, "__");
/// ```
#[derive(Clone)]
pub struct LoadOptions {
    /// Prefix every relevant environment variable starts with.
    pub prefix: String,
    /// Joins path segments in dotted keys.
    pub delimiter: String,
    /// Stands in for the delimiter inside environment variable names.
    pub separator: String,
    /// YAML file to load; `None` skips the file stage.
    pub yaml_file_path: Option<PathBuf>,
    /// Replaces the default prefix/separator key transform.
    pub env_key_transform: Option<Arc<dyn KeyTransform>>,
}

impl LoadOptions {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Self::default()
        }
    }

    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn with_yaml_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.yaml_file_path = Some(path.into());
        self
    }

    pub fn with_env_key_transform(mut self, transform: impl KeyTransform + 'static) -> Self {
        self.env_key_transform = Some(Arc::new(transform));
        self
    }

    /// Reject options no load could succeed with.
    pub fn validate(&self) -> LoadResult<()> {
        if self.delimiter.is_empty() {
            return Err(LoadError::invalid_options("delimiter must not be empty"));
        }
        if self.env_key_transform.is_none() && self.separator.is_empty() {
            return Err(LoadError::invalid_options(
                "separator must not be empty when using the default key transform",
            ));
        }
        Ok(())
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            delimiter: DEFAULT_DELIMITER.to_string(),
            separator: DEFAULT_SEPARATOR.to_string(),
            yaml_file_path: None,
            env_key_transform: None,
        }
    }
}

impl fmt::Debug for LoadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadOptions")
            .field("prefix", &self.prefix)
            .field("delimiter", &self.delimiter)
            .field("separator", &self.separator)
            .field("yaml_file_path", &self.yaml_file_path)
            .field(
                "env_key_transform",
                &self.env_key_transform.as_ref().map(|_| "custom"),
            )
            .finish()
    }
}
