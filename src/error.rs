//! Structured error types for configuration loading.

use serde::Serialize;
use std::path::PathBuf;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// `LoadOptions` cannot drive a load (empty delimiter, ...)
    InvalidOptions,
    /// Defaults could not be turned into dotted keys
    SchemaError,
    /// Config file requested but unreadable or malformed
    FileError,
    /// Process environment could not be enumerated as text
    EnvironmentError,
    /// Merged values do not fit the target's field types
    DecodeError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::InvalidOptions => write!(f, "INVALID_OPTIONS"),
            ErrorCode::SchemaError => write!(f, "SCHEMA_ERROR"),
            ErrorCode::FileError => write!(f, "FILE_ERROR"),
            ErrorCode::EnvironmentError => write!(f, "ENVIRONMENT_ERROR"),
            ErrorCode::DecodeError => write!(f, "DECODE_ERROR"),
        }
    }
}

/// Failure of a single `load` call.
///
/// Every variant is fatal for the call that produced it: the target is
/// never written when one of these is returned.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("invalid load options: {reason}")]
    InvalidOptions { reason: String },

    #[error("cannot build keys from defaults: {reason}")]
    Schema { reason: String },

    #[error("failed to read config file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {path}")]
    FileParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("config file {path} is not a mapping: {reason}")]
    FileShape { path: PathBuf, reason: String },

    #[error("environment variable is not valid unicode: {name}")]
    Environment { name: String },

    #[error("cannot decode `{key}`: {message}")]
    Decode { key: String, message: String },
}

impl LoadError {
    /// The code clients can match on without inspecting variant fields.
    pub fn code(&self) -> ErrorCode {
        match self {
            LoadError::InvalidOptions { .. } => ErrorCode::InvalidOptions,
            LoadError::Schema { .. } => ErrorCode::SchemaError,
            LoadError::FileRead { .. } | LoadError::FileParse { .. } | LoadError::FileShape { .. } => {
                ErrorCode::FileError
            }
            LoadError::Environment { .. } => ErrorCode::EnvironmentError,
            LoadError::Decode { .. } => ErrorCode::DecodeError,
        }
    }

    pub fn schema(reason: impl Into<String>) -> Self {
        LoadError::Schema {
            reason: reason.into(),
        }
    }

    pub fn invalid_options(reason: impl Into<String>) -> Self {
        LoadError::InvalidOptions {
            reason: reason.into(),
        }
    }

    pub fn decode(key: impl Into<String>, message: impl Into<String>) -> Self {
        LoadError::Decode {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// Result type for loader operations.
pub type LoadResult<T> = std::result::Result<T, LoadError>;
