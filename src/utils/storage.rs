use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use log::{debug, warn};
use crate::error::StorageError;

/// String-keyed durable slots, the shape of browser local storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

// All slots live in a single JSON object file, rewritten on every change.
pub struct JsonFileStore {
    path: PathBuf,
    slots: BTreeMap<String, String>,
}

impl JsonFileStore {
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();

        let file_exists_and_non_empty =
            path.exists() && fs::metadata(&path).map(|m| m.len() > 0).unwrap_or(false);

        let slots = if file_exists_and_non_empty {
            match fs::read_to_string(&path) {
                Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                    set_aside(&path, &e);
                    BTreeMap::new()
                }),
                Err(e) => {
                    warn!("Failed to read storage file {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        debug!("Opened storage {} with {} slot(s)", path.display(), slots.len());
        Self { path, slots }
    }

    fn flush(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&self.slots)?)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.slots.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.slots.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if self.slots.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

// An unparsable file would be overwritten by the next save, so it is moved to
// `<name>.corrupt` before the store starts empty.
fn set_aside(path: &Path, reason: &serde_json::Error) {
    let backup = corrupt_path(path);
    match fs::rename(path, &backup) {
        Ok(()) => warn!(
            "Storage file {} is unreadable ({}); moved it to {} and starting empty",
            path.display(),
            reason,
            backup.display()
        ),
        Err(e) => warn!(
            "Storage file {} is unreadable ({}) and could not be moved aside ({}); the next save will replace it",
            path.display(),
            reason,
            e
        ),
    }
}

fn corrupt_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".corrupt");
    PathBuf::from(name)
}

#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    slots: std::collections::HashMap<String, String>,
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.slots.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.slots.remove(key);
        Ok(())
    }
}

// Reads fine, refuses every write.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct FailingStore {
    slots: BTreeMap<String, String>,
}

#[cfg(test)]
impl FailingStore {
    pub fn holding(key: &str, value: &str) -> Self {
        Self { slots: BTreeMap::from([(key.to_string(), value.to_string())]) }
    }
}

#[cfg(test)]
impl KeyValueStore for FailingStore {
    fn get(&self, key: &str) -> Option<String> {
        self.slots.get(key).cloned()
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full").into())
    }

    fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
        Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full").into())
    }
}

// Lets several state containers share one backing file.
impl<S: KeyValueStore> KeyValueStore for Arc<Mutex<S>> {
    fn get(&self, key: &str) -> Option<String> {
        self.lock().unwrap_or_else(PoisonError::into_inner).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock().unwrap_or_else(PoisonError::into_inner).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.lock().unwrap_or_else(PoisonError::into_inner).remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let mut store = JsonFileStore::open(&path);
        store.set("favorites", "[1,2]").unwrap();
        store.set("session", "null").unwrap();
        store.remove("session").unwrap();

        let reopened = JsonFileStore::open(&path);
        assert_eq!(reopened.get("favorites").as_deref(), Some("[1,2]"));
        assert_eq!(reopened.get("session"), None);
    }

    #[test]
    fn corrupt_file_opens_empty_and_is_kept_aside() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "not-json").unwrap();

        let mut store = JsonFileStore::open(&path);
        assert_eq!(store.get("favorites"), None);

        let backup = dir.path().join("store.json.corrupt");
        assert_eq!(fs::read_to_string(&backup).unwrap(), "not-json");

        store.set("favorites", "[1]").unwrap();
        assert_eq!(fs::read_to_string(&backup).unwrap(), "not-json");
        assert_eq!(JsonFileStore::open(&path).get("favorites").as_deref(), Some("[1]"));
    }

    #[test]
    fn failing_store_reads_but_refuses_writes() {
        let mut store = FailingStore::holding("favorites", "[1]");
        assert_eq!(store.get("favorites").as_deref(), Some("[1]"));
        assert!(matches!(store.set("favorites", "[2]"), Err(StorageError::Io(_))));
        assert!(store.remove("favorites").is_err());
    }

    #[test]
    fn shared_handles_write_through_one_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        let shared = Arc::new(Mutex::new(JsonFileStore::open(&path)));

        let mut first = Arc::clone(&shared);
        let mut second = Arc::clone(&shared);
        first.set("favorites", "[1]").unwrap();
        second.set("session", "{}").unwrap();

        let reopened = JsonFileStore::open(&path);
        assert_eq!(reopened.get("favorites").as_deref(), Some("[1]"));
        assert_eq!(reopened.get("session").as_deref(), Some("{}"));
    }

    #[test]
    fn missing_and_empty_files_open_empty() {
        let dir = TempDir::new().unwrap();
        let empty = dir.path().join("empty.json");
        fs::write(&empty, "").unwrap();

        assert_eq!(JsonFileStore::open(dir.path().join("absent.json")).get("x"), None);
        assert_eq!(JsonFileStore::open(&empty).get("x"), None);
    }
}
