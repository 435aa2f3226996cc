//! # JSON values
//! Typed access on top of a [`KeyValueStore`]. Reads never fail: a missing key, an
//! unreadable backend, or a value that no longer parses all fall back to `T::default()`.
//! The next [`save_json`] overwrites whatever was there.

use serde::{Serialize, de::DeserializeOwned};

use crate::store::{KeyValueStore, StoreError};

pub fn load_json<T, S>(store: &S, key: &str) -> T
where
    T: DeserializeOwned + Default,
    S: KeyValueStore + ?Sized,
{
    let raw = match store.get_item(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(e) => {
            log::warn!("Could not read {key} from storage, using default: {e}");
            return T::default();
        }
    };

    serde_json::from_str(&raw).unwrap_or_else(|e| {
        log::warn!("Stored value for {key} is not valid JSON, using default: {e}");
        T::default()
    })
}

pub fn save_json<T, S>(store: &mut S, key: &str, value: &T) -> Result<(), StoreError>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    store.set_item(key, &raw)
}
