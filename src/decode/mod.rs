//! Decode stage: merged store into the caller's typed target.

mod weak;

pub use weak::{DecodeError, WeakValue, split_commas};

use crate::error::{LoadError, LoadResult};
use crate::merge::deep_merge;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Key reported for failures at the top of the tree.
pub const ROOT_KEY: &str = "<root>";

/// Decode a value tree into `T` with weak typing.
pub fn decode_value<T>(value: Value, delimiter: &str) -> LoadResult<T>
where
    T: DeserializeOwned,
{
    T::deserialize(WeakValue::root(value, delimiter)).map_err(|e| {
        let key = if e.path().is_empty() {
            ROOT_KEY
        } else {
            e.path()
        };
        LoadError::decode(key, e.message())
    })
}

/// Lay `overlay` over the target's current state and decode the result.
///
/// Keys absent from `overlay` keep whatever the target already held. The
/// target is only replaced once decoding fully succeeds.
pub fn decode_into<T>(target: &mut T, overlay: Value, delimiter: &str) -> LoadResult<()>
where
    T: Serialize + DeserializeOwned,
{
    let base = serde_json::to_value(&*target)
        .map_err(|e| LoadError::decode(ROOT_KEY, format!("cannot read current target: {}", e)))?;
    let decoded = decode_value(deep_merge(base, overlay), delimiter)?;
    *target = decoded;
    Ok(())
}
