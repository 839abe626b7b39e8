//! Guest Cart Id Storage
//!
//! A guest session keeps exactly one value on the client: the id of its cart.
//! It is read on startup and cleared once a merge into a user cart succeeds.

use crate::cart::models::CartId;
use crate::error::StorageError;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Key under which the guest cart id is stored.
pub const GUEST_CART_KEY: &str = "guestCartId";

/// Persistence for the guest cart id.
pub trait CartIdStore: Send + Sync {
    fn load(&self) -> Result<Option<CartId>, StorageError>;
    fn save(&self, cart_id: &CartId) -> Result<(), StorageError>;
    fn clear(&self) -> Result<(), StorageError>;
}

// =============================================================================
// In-memory store
// =============================================================================

/// Process-local store, for tests and sessions that should not touch disk.
#[derive(Debug, Default)]
pub struct MemoryCartIdStore {
    value: Mutex<Option<CartId>>,
}

impl MemoryCartIdStore {
    pub fn with_cart_id(cart_id: CartId) -> Self {
        Self {
            value: Mutex::new(Some(cart_id)),
        }
    }
}

impl CartIdStore for MemoryCartIdStore {
    fn load(&self) -> Result<Option<CartId>, StorageError> {
        Ok(self.value.lock().clone())
    }

    fn save(&self, cart_id: &CartId) -> Result<(), StorageError> {
        *self.value.lock() = Some(cart_id.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.value.lock() = None;
        Ok(())
    }
}

// =============================================================================
// File store
// =============================================================================

/// JSON key/value file, the desktop equivalent of browser local storage.
#[derive(Debug)]
pub struct FileCartIdStore {
    path: PathBuf,
}

impl FileCartIdStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data dir>/storefront/cart.json`
    pub fn default_location() -> Result<Self, StorageError> {
        let dir = dirs::data_dir().ok_or(StorageError::NoDataDir)?;
        Ok(Self::new(dir.join("storefront").join("cart.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl CartIdStore for FileCartIdStore {
    fn load(&self) -> Result<Option<CartId>, StorageError> {
        Ok(self.read_entries()?.remove(GUEST_CART_KEY).map(CartId::from))
    }

    fn save(&self, cart_id: &CartId) -> Result<(), StorageError> {
        let mut entries = self.read_entries()?;
        entries.insert(GUEST_CART_KEY.to_string(), cart_id.to_string());
        self.write_entries(&entries)
    }

    fn clear(&self) -> Result<(), StorageError> {
        let mut entries = self.read_entries()?;
        if entries.remove(GUEST_CART_KEY).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryCartIdStore::default();
        assert!(store.load().unwrap().is_none());

        store.save(&CartId::from("g1")).unwrap();
        assert_eq!(store.load().unwrap(), Some(CartId::from("g1")));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn file_store_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cart.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"{"theme":"dark"}"#).unwrap();

        let store = FileCartIdStore::new(&path);
        store.save(&CartId::from("guest-42")).unwrap();
        assert_eq!(store.load().unwrap(), Some(CartId::from("guest-42")));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());

        let remaining: BTreeMap<String, String> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(remaining.get("theme").map(String::as_str), Some("dark"));
    }

    #[test]
    fn missing_file_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCartIdStore::new(dir.path().join("absent.json"));
        assert!(store.load().unwrap().is_none());
        store.clear().unwrap();
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.json");
        fs::write(&path, "not json").unwrap();

        let err = FileCartIdStore::new(&path).load().unwrap_err();
        assert!(matches!(err, StorageError::Format(_)));
    }
}
