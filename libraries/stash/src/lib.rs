//! This is a library for keeping small pieces of user state across page loads.
//! It was created for the interview study page, so it only covers what that page needs.
//!
//! Storage strategy:
//! 1. Every value lives under a string key, as a string (the browser `localStorage` model).
//! 2. Typed values are stored as JSON. Reading a key that is missing or that no longer parses
//!    yields the type's default instead of an error, so a corrupt entry heals on the next write.
//! 3. Writes always replace the whole value. There is no append log.
//!
//! The backend is chosen by whoever builds the application and is passed in explicitly.
//! There is no global store.

pub mod dirty_tracker;
pub mod json;
pub mod listeners;
pub mod store;

#[cfg(not(target_arch = "wasm32"))]
pub mod file;

#[cfg(target_arch = "wasm32")]
#[cfg(feature = "local-storage")]
pub mod browser;

pub use dirty_tracker::{DirtyOnDerefMut, DirtyTracker};
pub use json::{load_json, save_json};
pub use listeners::{ListenerKey, Listeners};
pub use store::{KeyValueStore, MemoryStore, StoreError};

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStore;

#[cfg(target_arch = "wasm32")]
#[cfg(feature = "local-storage")]
pub use browser::BrowserStorage;
