//! Browser backend over `window.localStorage`.

use crate::store::{KeyValueStore, StoreError};

#[derive(Debug, Clone)]
pub struct BrowserStorage {
    storage: web_sys::Storage,
}

fn js_error(context: &str, e: wasm_bindgen::JsValue) -> StoreError {
    StoreError::Unavailable(format!("{context}: {e:?}"))
}

impl BrowserStorage {
    pub fn local() -> Result<Self, StoreError> {
        let window = web_sys::window()
            .ok_or_else(|| StoreError::Unavailable("no window object".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(|e| js_error("localStorage access denied", e))?
            .ok_or_else(|| StoreError::Unavailable("localStorage is disabled".to_string()))?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for BrowserStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.storage
            .get_item(key)
            .map_err(|e| js_error("getItem failed", e))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| js_error("setItem failed", e))
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StoreError> {
        self.storage
            .remove_item(key)
            .map_err(|e| js_error("removeItem failed", e))
    }
}
