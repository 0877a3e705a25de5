use std::{
    cell::RefCell,
    collections::{BTreeMap, HashMap},
    fs,
    path::PathBuf,
    rc::Rc,
};

use tracing::warn;

use crate::{error::StoreError, index::AuthorId};

/// Durable key/value storage, shaped like a browser's local storage.
pub trait Storage {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Storage kept in memory. Clones share the same map.
#[derive(Clone, Default, Debug)]
pub struct MemoryStorage(Rc<RefCell<HashMap<String, String>>>);

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.0.borrow().get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.0.borrow_mut().insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Storage with one `<key>.json` file per key in a directory.
#[derive(Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(FileStorage { dir })
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path(key)).ok()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        // Write next to the target and rename over it so readers never see
        // half a document.
        let path = self.path(key);
        let temp = path.with_extension("json.tmp");
        fs::write(&temp, value)?;
        fs::rename(&temp, &path)?;
        Ok(())
    }
}

/// The persisted author -> banned mapping.
pub struct BanStore {
    storage: Box<dyn Storage>,
    key: String,
    bans: BTreeMap<AuthorId, bool>,
}

impl BanStore {
    /// Reads the mapping from storage. A missing or malformed document loads
    /// as an empty mapping, and values that are not booleans are ignored.
    pub fn load(storage: Box<dyn Storage>, key: impl Into<String>) -> Self {
        let key = key.into();
        let bans = match storage.get(&key) {
            Some(document) => parse_document(&document, &key),
            None => BTreeMap::new(),
        };
        BanStore { storage, key, bans }
    }

    pub fn is_banned(&self, author: &str) -> bool {
        self.bans.get(author).copied().unwrap_or(false)
    }

    /// Sets the flag for an author and rewrites the whole mapping. The
    /// in-memory copy only changes once the write succeeded.
    pub fn set_banned(&mut self, author: &str, banned: bool) -> Result<(), StoreError> {
        let mut bans = self.bans.clone();
        bans.insert(author.to_owned(), banned);
        let document = serde_json::to_string(&bans)?;
        self.storage.set(&self.key, &document)?;
        self.bans = bans;
        Ok(())
    }

    pub fn bans(&self) -> &BTreeMap<AuthorId, bool> {
        &self.bans
    }
}

fn parse_document(document: &str, key: &str) -> BTreeMap<AuthorId, bool> {
    match serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(document) {
        Ok(map) => map
            .into_iter()
            .filter_map(|(author, value)| value.as_bool().map(|banned| (author, banned)))
            .collect(),
        Err(e) => {
            warn!(key = %key, error = %e, "ignoring malformed ban list");
            BTreeMap::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingStorage;

    impl Storage for FailingStorage {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(std::io::Error::other("disk full").into())
        }
    }

    #[test]
    fn missing_document_loads_empty() {
        let store = BanStore::load(Box::new(MemoryStorage::new()), "bans");
        assert!(store.bans().is_empty());
        assert!(!store.is_banned("alice"));
    }

    #[test]
    fn malformed_document_loads_empty() {
        let mut storage = MemoryStorage::new();
        storage.set("bans", "{not json").unwrap();
        let store = BanStore::load(Box::new(storage), "bans");
        assert!(store.bans().is_empty());
    }

    #[test]
    fn non_boolean_values_are_ignored() {
        let mut storage = MemoryStorage::new();
        storage
            .set("bans", r#"{"alice": true, "bob": "yes", "carol": false}"#)
            .unwrap();
        let store = BanStore::load(Box::new(storage), "bans");
        assert!(store.is_banned("alice"));
        assert!(!store.is_banned("bob"));
        assert_eq!(store.bans().len(), 2);
    }

    #[test]
    fn set_banned_rewrites_whole_document() {
        let storage = MemoryStorage::new();
        let mut store = BanStore::load(Box::new(storage.clone()), "bans");
        store.set_banned("alice", true).unwrap();
        store.set_banned("bob", true).unwrap();
        store.set_banned("alice", false).unwrap();
        assert_eq!(
            storage.get("bans").unwrap(),
            r#"{"alice":false,"bob":true}"#
        );
        assert!(!store.is_banned("alice"));
        assert!(store.is_banned("bob"));
    }

    #[test]
    fn failed_write_leaves_memory_untouched() {
        let mut store = BanStore::load(Box::new(FailingStorage), "bans");
        assert!(store.set_banned("alice", true).is_err());
        assert!(!store.is_banned("alice"));
    }

    #[test]
    fn file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = BanStore::load(Box::new(FileStorage::open(dir.path()).unwrap()), "bans");
        store.set_banned("alice", true).unwrap();

        let store = BanStore::load(Box::new(FileStorage::open(dir.path()).unwrap()), "bans");
        assert!(store.is_banned("alice"));
        assert!(!dir.path().join("bans.json.tmp").exists());
    }
}
