//! Client-local persistent storage for reducer state.
//!
//! Mirrors the browser `localStorage` contract: string values under string
//! keys, read once on load and rewritten on every mutation. A missing or
//! unreadable value is never fatal; the state simply starts empty.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

/// Storage key for the cart.
pub const CART_STORAGE_KEY: &str = "cart";
/// Storage key for the wishlist.
pub const WISHLIST_STORAGE_KEY: &str = "wishlist";

/// Errors raised by a [`KeyValueStore`].
#[derive(Debug, Error)]
pub enum StorageError {
    /// The key contains characters outside `[A-Za-z0-9_-]`.
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),

    /// Filesystem operation failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),

    /// State could not be serialized.
    #[error("failed to serialize state: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// String key-value storage.
pub trait KeyValueStore {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or the backing store fails.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or the backing store fails.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory store, for tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Directory-backed store: one `<key>.json` file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Use `root` as the storage directory (created on first write).
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The storage directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_owned()));
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.root)?;

        // Write then rename so a crash never leaves a half-written value
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// State with a pure transition function.
pub trait Reducer: Default + Serialize + DeserializeOwned {
    /// Transition input.
    type Action;

    /// Apply `action` and return the next state.
    #[must_use]
    fn reduce(self, action: Self::Action) -> Self;
}

/// Reducer state bound to a storage key.
///
/// Actions are applied one at a time against the latest state (`&mut self`
/// rules out stale snapshots), and the result is written back after each one.
#[derive(Debug)]
pub struct PersistedState<T, S> {
    state: T,
    store: S,
    key: &'static str,
}

impl<T: Reducer, S: KeyValueStore> PersistedState<T, S> {
    /// Load state from `store`, falling back to the default state.
    ///
    /// A missing value, an unreadable store, or a value that does not parse
    /// all yield `T::default()`.
    pub fn load(store: S, key: &'static str) -> Self {
        let state = match store.get(key) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(key, error = %e, "Discarding corrupt stored state");
                T::default()
            }),
            Ok(None) => T::default(),
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to read stored state");
                T::default()
            }
        };

        Self { state, store, key }
    }

    /// Current state.
    pub fn state(&self) -> &T {
        &self.state
    }

    /// Apply an action and persist the result.
    ///
    /// The in-memory state advances even if writing fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the new state could not be written.
    pub fn dispatch(&mut self, action: T::Action) -> Result<&T, StorageError> {
        let current = std::mem::take(&mut self.state);
        self.state = current.reduce(action);
        self.persist()?;
        Ok(&self.state)
    }

    fn persist(&mut self) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&self.state)?;
        self.store.set(self.key, &raw)
    }

    /// Release the state and the store.
    pub fn into_parts(self) -> (T, S) {
        (self.state, self.store)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cart::{Cart, CartAction, CartLineItem};
    use crate::types::{Money, VariantId};
    use crate::wishlist::{Wishlist, WishlistAction, WishlistItem};

    fn add(variant: &str) -> CartAction {
        CartAction::AddItem {
            item: CartLineItem::new(variant, "Tee", "", Money::new("10.00", "USD")),
        }
    }

    #[test]
    fn test_missing_value_loads_empty() {
        let cart = PersistedState::<Cart, _>::load(MemoryStore::new(), CART_STORAGE_KEY);
        assert!(cart.state().is_empty());
    }

    #[test]
    fn test_corrupt_value_loads_empty() {
        let mut store = MemoryStore::new();
        store.set(CART_STORAGE_KEY, "{not json").unwrap();

        let cart = PersistedState::<Cart, _>::load(store, CART_STORAGE_KEY);
        assert!(cart.state().is_empty());
    }

    #[test]
    fn test_wrong_shape_loads_empty() {
        let mut store = MemoryStore::new();
        store.set(CART_STORAGE_KEY, r#"{"items": 3}"#).unwrap();

        let cart = PersistedState::<Cart, _>::load(store, CART_STORAGE_KEY);
        assert!(cart.state().is_empty());
    }

    #[test]
    fn test_every_dispatch_is_persisted() {
        let mut cart = PersistedState::<Cart, _>::load(MemoryStore::new(), CART_STORAGE_KEY);
        cart.dispatch(add("A")).unwrap();
        cart.dispatch(add("A")).unwrap();

        let (_, store) = cart.into_parts();
        let raw = store.get(CART_STORAGE_KEY).unwrap().unwrap();
        let reloaded: Cart = serde_json::from_str(&raw).unwrap();
        assert_eq!(reloaded.item_count(), 2);
    }

    #[test]
    fn test_sequential_dispatch_uses_latest_state() {
        let mut cart = PersistedState::<Cart, _>::load(MemoryStore::new(), CART_STORAGE_KEY);
        cart.dispatch(add("A")).unwrap();
        cart.dispatch(CartAction::SetQuantity {
            variant_id: VariantId::new("A"),
            quantity: 5,
        })
        .unwrap();
        let state = cart.dispatch(add("A")).unwrap();
        assert_eq!(state.item_count(), 6);
    }

    #[test]
    fn test_file_store_round_trip_across_sessions() {
        let dir = tempfile::tempdir().unwrap();

        {
            let mut wishlist = PersistedState::<Wishlist, _>::load(
                FileStore::new(dir.path()),
                WISHLIST_STORAGE_KEY,
            );
            wishlist
                .dispatch(WishlistAction::Add {
                    item: WishlistItem::new("A", "Tee"),
                })
                .unwrap();
        }

        let wishlist =
            PersistedState::<Wishlist, _>::load(FileStore::new(dir.path()), WISHLIST_STORAGE_KEY);
        assert!(wishlist.state().contains(&VariantId::new("A")));
        assert!(dir.path().join("wishlist.json").exists());
        assert!(!dir.path().join("wishlist.json.tmp").exists());
    }

    #[test]
    fn test_file_store_missing_directory_reads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("never-created"));
        assert!(store.get(CART_STORAGE_KEY).unwrap().is_none());
    }

    #[test]
    fn test_file_store_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path());

        for key in ["../cart", "a/b", "", "cart.json"] {
            assert!(matches!(
                store.set(key, "[]"),
                Err(StorageError::InvalidKey(_))
            ));
        }
    }
}
