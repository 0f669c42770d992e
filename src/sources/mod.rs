//! Source adapters feeding the layered store.
//!
//! Each adapter turns one origin into dotted keys:
//! 1. **Defaults** - the caller's default value, walked through `Serialize`
//! 2. **File** - an optional YAML document
//! 3. **Environment** - prefixed variables, renamed by a `KeyTransform`

pub mod defaults;
pub mod env;
pub mod file;

pub use defaults::collect_defaults;
pub use env::{DefaultKeyTransform, KeyTransform, collect_env};
pub use file::{parse_yaml_str, read_yaml_file};
