//! Layered configuration loading.
//!
//! Builds one typed configuration value from three sources, lowest to highest
//! precedence:
//! 1. **Defaults** - a value of the target type supplied by the caller
//! 2. **File** - an optional YAML document
//! 3. **Environment** - variables named `{prefix}{SECTION}{separator}{FIELD}`
//!
//! Field names (or `#[serde(rename = "...")]`) are the path segments. Text
//! from the environment is coerced to each field's type, and a comma separated
//! string fills a list field.
//!
//! ```
//! use layered_config::{LoadOptions, load_with_env};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Default, Serialize, Deserialize)]
//! struct DbOptions {
//!     max_thread_count: u32,
//! }
//!
//! #[derive(Debug, Default, Serialize, Deserialize)]
//! struct Db {
//!     host: String,
//!     options: DbOptions,
//! }
//!
//! #[derive(Debug, Default, Serialize, Deserialize)]
//! struct Config {
//!     debug: bool,
//!     db: Db,
//! }
//!
//! let defaults = Config {
//!     debug: true,
//!     db: Db { host: "localhost".into(), options: DbOptions { max_thread_count: 22 } },
//! };
//! let env = [("QUICK_DB__OPTIONS__MAX_THREAD_COUNT", "65")];
//!
//! let mut config = Config::default();
//! load_with_env(&LoadOptions::new("QUICK_"), &mut config, Some(&defaults), env)?;
//! assert_eq!(config.db.host, "localhost");
//! assert_eq!(config.db.options.max_thread_count, 65);
//! # Ok::<(), layered_config::LoadError>(())
//! ```

pub mod cli;
pub mod decode;
pub mod duration;
pub mod error;
pub mod format;
pub mod loader;
pub mod logging;
pub mod merge;
pub mod options;
pub mod sources;
pub mod store;

pub use error::{ErrorCode, LoadError, LoadResult};
pub use loader::{Loader, load, load_with_env};
pub use options::LoadOptions;
pub use sources::{DefaultKeyTransform, KeyTransform};
pub use store::{Layer, LayeredStore};
