//! Environment variable adapter.
//!
//! Variables are matched on a case-sensitive prefix and renamed into dotted
//! keys by a [`KeyTransform`]. Values are always kept as text; the decode
//! stage coerces them to the target's field types.

use crate::error::{LoadError, LoadResult};
use crate::options::LoadOptions;
use std::ffi::OsString;

/// Strategy mapping a raw variable name to a dotted key.
///
/// Any `Fn(&str) -> String + Send + Sync` closure is a transform. Returning an
/// empty key skips the variable.
pub trait KeyTransform: Send + Sync {
    fn transform(&self, name: &str) -> String;
}

impl<F> KeyTransform for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn transform(&self, name: &str) -> String {
        self(name)
    }
}

/// Strip the prefix, lower-case, then turn each separator into the delimiter.
///
/// ```
/// use layered_config::sources::{DefaultKeyTransform, KeyTransform};
///
/// let transform = DefaultKeyTransform::new("QUICK_", "__", ".");
/// assert_eq!(
///     transform.transform("QUICK_DB__OPTIONS__MAX_THREAD_COUNT"),
///     "db.options.max_thread_count"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultKeyTransform {
    prefix: String,
    separator: String,
    delimiter: String,
}

impl DefaultKeyTransform {
    pub fn new(
        prefix: impl Into<String>,
        separator: impl Into<String>,
        delimiter: impl Into<String>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            separator: separator.into(),
            delimiter: delimiter.into(),
        }
    }

    pub fn from_options(options: &LoadOptions) -> Self {
        Self::new(&options.prefix, &options.separator, &options.delimiter)
    }
}

impl KeyTransform for DefaultKeyTransform {
    fn transform(&self, name: &str) -> String {
        let base = name.strip_prefix(self.prefix.as_str()).unwrap_or(name);
        let base = base.to_lowercase();
        if self.separator.is_empty() {
            return base;
        }
        // The name is already lower-cased, so match the separator that way too.
        base.replace(&self.separator.to_lowercase(), &self.delimiter)
    }
}

/// Select prefixed variables and rename them into `(key, value)` pairs.
///
/// The result is ordered by variable name so colliding keys resolve the same
/// way on every run. A prefixed variable whose name or value is not valid
/// Unicode is an environment error; unrelated variables are never inspected.
pub fn collect_env<I, K, V>(
    vars: I,
    prefix: &str,
    transform: &dyn KeyTransform,
) -> LoadResult<Vec<(String, String)>>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<OsString>,
    V: Into<OsString>,
{
    let mut matched: Vec<(String, String)> = Vec::new();

    for (name, value) in vars {
        let name: OsString = name.into();
        if !name.as_encoded_bytes().starts_with(prefix.as_bytes()) {
            continue;
        }

        let name = name.into_string().map_err(|raw| LoadError::Environment {
            name: raw.to_string_lossy().into_owned(),
        })?;
        let value: OsString = value.into();
        let value = value
            .into_string()
            .map_err(|_| LoadError::Environment { name: name.clone() })?;

        matched.push((name, value));
    }

    matched.sort_by(|a, b| a.0.cmp(&b.0));

    let mut pairs = Vec::with_capacity(matched.len());
    for (name, value) in matched {
        let key = transform.transform(&name);
        if key.is_empty() {
            tracing::warn!("Skipping environment variable {}: transform returned no key", name);
            continue;
        }
        pairs.push((key, value));
    }

    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn quick() -> DefaultKeyTransform {
        DefaultKeyTransform::new("QUICK_", "__", ".")
    }

    #[test]
    fn test_default_transform_nested_key() {
        assert_eq!(
            quick().transform("QUICK_DB__OPTIONS__MAX_THREAD_COUNT"),
            "db.options.max_thread_count"
        );
        assert_eq!(quick().transform("QUICK_APPLICATION__PORT"), "application.port");
    }

    #[test]
    fn test_default_transform_single_underscore_kept() {
        assert_eq!(quick().transform("QUICK_SHUTDOWN_TIMEOUT"), "shutdown_timeout");
    }

    #[test]
    fn test_default_transform_custom_delimiter() {
        let transform = DefaultKeyTransform::new("APP_", "__", "/");
        assert_eq!(transform.transform("APP_HTTP_SERVER__PORT"), "http_server/port");
    }

    #[test]
    fn test_collect_filters_on_prefix_case_sensitively() {
        let vars = vec![
            ("QUICK_DEBUG", "false"),
            ("quick_debug", "true"),
            ("PATH", "/usr/bin"),
            ("QUICK_DB__HOST", "db.internal"),
        ];
        let pairs = collect_env(vars, "QUICK_", &quick()).unwrap();
        assert_eq!(
            pairs,
            vec![
                ("db.host".to_string(), "db.internal".to_string()),
                ("debug".to_string(), "false".to_string()),
            ]
        );
    }

    #[test]
    fn test_closure_transform_and_empty_key_skipped() {
        let transform = |name: &str| {
            if name == "APP_IGNORED" {
                String::new()
            } else {
                name.trim_start_matches("APP_").to_lowercase().replace('_', ".")
            }
        };
        let vars = vec![("APP_IGNORED", "x"), ("APP_DB_HOST", "h")];
        let pairs = collect_env(vars, "APP_", &transform).unwrap();
        assert_eq!(pairs, vec![("db.host".to_string(), "h".to_string())]);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_unicode_prefixed_variable_is_fatal() {
        use std::os::unix::ffi::OsStringExt;

        let bad_value = OsString::from_vec(vec![0x66, 0x6f, 0xff]);
        let vars = vec![(OsString::from("QUICK_DEBUG"), bad_value)];
        let err = collect_env(vars, "QUICK_", &quick()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::EnvironmentError);

        let bad_name = OsString::from_vec(b"OTHER_\xff".to_vec());
        let vars = vec![(bad_name, OsString::from("ignored"))];
        assert!(collect_env(vars, "QUICK_", &quick()).unwrap().is_empty());
    }
}
