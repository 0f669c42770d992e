//! Loader that merges defaults, a YAML file and environment variables.
//!
//! Stages run in a fixed order and each one overrides the keys written by the
//! previous ones:
//! 1. **Defaults** - the caller's default value (lowest priority)
//! 2. **File** - `LoadOptions::yaml_file_path`, when set
//! 3. **Environment** - variables starting with `LoadOptions::prefix`
//!
//! The merged store is then decoded into the target with weak typing.

use crate::decode;
use crate::error::LoadResult;
use crate::options::LoadOptions;
use crate::sources::{self, DefaultKeyTransform, KeyTransform};
use crate::store::{Layer, LayeredStore};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::ffi::OsString;
use tracing::{debug, info};

/// Stage-by-stage access to a single load.
///
/// [`load`] is the usual entry point; `Loader` exists for callers that want
/// to inspect the store (for example to report which layer set each key).
#[derive(Debug)]
pub struct Loader<'o> {
    options: &'o LoadOptions,
    store: LayeredStore,
}

impl<'o> Loader<'o> {
    /// Validate `options` and start with an empty store.
    pub fn new(options: &'o LoadOptions) -> LoadResult<Self> {
        options.validate()?;
        Ok(Self {
            options,
            store: LayeredStore::new(options.delimiter.clone()),
        })
    }

    /// Write every field of `defaults` into the store.
    pub fn load_defaults<T>(&mut self, defaults: Option<&T>) -> LoadResult<()>
    where
        T: Serialize + ?Sized,
    {
        let Some(defaults) = defaults else {
            debug!("No defaults supplied");
            return Ok(());
        };

        let tree = sources::collect_defaults(defaults, &self.options.delimiter)?;
        self.store.merge_tree(&tree, Layer::Defaults);
        debug!("Loaded defaults ({} keys)", self.store.len());
        Ok(())
    }

    /// Overlay the YAML file, if one is configured.
    pub fn load_file(&mut self) -> LoadResult<()> {
        let Some(path) = self.options.yaml_file_path.as_deref() else {
            return Ok(());
        };

        let tree = sources::read_yaml_file(path)?;
        self.store.merge_tree(&tree, Layer::File);
        debug!("Loaded config file: {}", path.display());
        Ok(())
    }

    /// Overlay prefixed variables from the process environment.
    pub fn load_env(&mut self) -> LoadResult<()> {
        self.load_env_from(std::env::vars_os())
    }

    /// Overlay prefixed variables from an explicit environment snapshot.
    pub fn load_env_from<I, K, V>(&mut self, vars: I) -> LoadResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        let default_transform;
        let transform: &dyn KeyTransform = match &self.options.env_key_transform {
            Some(custom) => custom.as_ref(),
            None => {
                default_transform = DefaultKeyTransform::from_options(self.options);
                &default_transform
            }
        };

        let pairs = sources::collect_env(vars, &self.options.prefix, transform)?;
        let count = pairs.len();
        for (key, value) in pairs {
            self.store.set(key, Value::String(value), Layer::Environment);
        }
        debug!(
            "Loaded {} environment variables with prefix {:?}",
            count, self.options.prefix
        );
        Ok(())
    }

    /// The merged store so far.
    pub fn store(&self) -> &LayeredStore {
        &self.store
    }

    /// Consume the loader and return the merged store.
    pub fn into_store(self) -> LayeredStore {
        self.store
    }

    /// Decode the merged store into `target`.
    ///
    /// On error `target` is left exactly as it was.
    pub fn decode_into<T>(self, target: &mut T) -> LoadResult<()>
    where
        T: Serialize + DeserializeOwned,
    {
        let keys = self.store.len();
        decode::decode_into(target, self.store.to_tree(), &self.options.delimiter)?;
        info!("Configuration loaded ({} keys)", keys);
        Ok(())
    }
}

/// Load configuration into `target` from defaults, the optional YAML file and
/// the process environment, in that order of increasing precedence.
///
/// ```no_run
/// use layered_config::{LoadOptions, load};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Default, Serialize, Deserialize)]
/// struct Config {
///     debug: bool,
///     allow_origins: Vec<String>,
/// }
///
/// let options = LoadOptions::new("QUICK_").with_yaml_file("config.yml");
/// let defaults = Config { debug: true, ..Config::default() };
/// let mut config = Config::default();
/// load(&options, &mut config, Some(&defaults))?;
/// # Ok::<(), layered_config::LoadError>(())
/// ```
pub fn load<T>(options: &LoadOptions, target: &mut T, defaults: Option<&T>) -> LoadResult<()>
where
    T: Serialize + DeserializeOwned,
{
    run(options, target, defaults, |loader| loader.load_env())
}

/// Same as [`load`], reading variables from `vars` instead of the process
/// environment.
pub fn load_with_env<T, I, K, V>(
    options: &LoadOptions,
    target: &mut T,
    defaults: Option<&T>,
    vars: I,
) -> LoadResult<()>
where
    T: Serialize + DeserializeOwned,
    I: IntoIterator<Item = (K, V)>,
    K: Into<OsString>,
    V: Into<OsString>,
{
    run(options, target, defaults, |loader| loader.load_env_from(vars))
}

fn run<T, F>(options: &LoadOptions, target: &mut T, defaults: Option<&T>, env: F) -> LoadResult<()>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce(&mut Loader<'_>) -> LoadResult<()>,
{
    let mut loader = Loader::new(options)?;
    loader.load_defaults(defaults)?;
    loader.load_file()?;
    env(&mut loader)?;
    loader.decode_into(target)
}
