//! Client-side configuration.
//!
//! Settings are plain strings in a key-value store, read through [`KeyValueStore`]. A missing key is the same as the
//! default. On `wasm32` the store is the browser's `localStorage`.

use core::cell::RefCell;
use hashbrown::HashMap;
use tracing::trace;

pub trait KeyValueStore {
	fn get(&self, key: &str) -> Option<String>;
}

/// Reads a boolean flag. Only the exact string `"true"` counts as set.
pub fn flag(store: &(impl KeyValueStore + ?Sized), key: &str) -> bool {
	let value = store.get(key);
	trace!(key, value = ?value, "Read flag.");
	value.as_deref() == Some("true")
}

/// An in-process store with interior mutability, so it can be shared with views behind an `Rc`.
#[derive(Debug, Default)]
pub struct MemoryStore(RefCell<HashMap<String, String>>);

impl MemoryStore {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
		self.0.borrow_mut().insert(key.into(), value.into());
	}

	pub fn remove(&self, key: &str) -> Option<String> {
		self.0.borrow_mut().remove(key)
	}
}

impl KeyValueStore for MemoryStore {
	fn get(&self, key: &str) -> Option<String> {
		self.0.borrow().get(key).cloned()
	}
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MemoryStore {
	fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
		Self(RefCell::new(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect()))
	}
}

#[cfg(target_arch = "wasm32")]
pub use web::LocalStorage;

#[cfg(target_arch = "wasm32")]
mod web {
	use super::KeyValueStore;
	use tracing::warn;

	/// `window.localStorage`. Reads fail soft: an unavailable store reads as empty.
	#[derive(Debug, Default, Clone, Copy)]
	pub struct LocalStorage;

	impl KeyValueStore for LocalStorage {
		fn get(&self, key: &str) -> Option<String> {
			let storage = match web_sys::window().map(|window| window.local_storage()) {
				Some(Ok(Some(storage))) => storage,
				_ => {
					warn!("`localStorage` is unavailable.");
					return None;
				}
			};
			storage.get_item(key).ok().flatten()
		}
	}
}
