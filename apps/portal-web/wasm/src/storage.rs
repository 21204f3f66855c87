//! `sessionStorage` behind the core's storage port

use portal_core::{KeyValueStore, StorageError};
use wasm_bindgen::JsValue;

/// Cleared when the tab closes, like the token it holds
pub struct SessionStore {
    storage: web_sys::Storage,
}

impl SessionStore {
    pub fn open() -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or("No window")?;
        let storage = window.session_storage()?.ok_or("No sessionStorage")?;
        Ok(Self { storage })
    }
}

fn unavailable(err: JsValue) -> StorageError {
    StorageError::Unavailable(err.as_string().unwrap_or_else(|| format!("{:?}", err)))
}

impl KeyValueStore for SessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage.get_item(key).map_err(unavailable)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage.set_item(key, value).map_err(unavailable)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.storage.remove_item(key).map_err(unavailable)
    }
}
