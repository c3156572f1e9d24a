//! Local persisted state: a small JSON key-value file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::errors::{ClientError, Result};

/// The connected account.
pub const WALLET_KEY: &str = "borkchain_wallet";
/// Cached task list.
pub const TASKS_KEY: &str = "borkchain_tasks";
/// Cached user record.
pub const USER_KEY: &str = "borkchain_user";

#[derive(Debug, Default)]
pub struct LocalStore {
    path: Option<PathBuf>,
    entries: BTreeMap<String, Value>,
}

impl LocalStore {
    /// Open the store at `path`, starting empty when the file does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&raw).map_err(|e| {
                    ClientError::Storage(format!("Corrupt state file {}: {e}", path.display()))
                })?
            }
        } else {
            BTreeMap::new()
        };
        debug!("Opened local store {} ({} keys)", path.display(), entries.len());
        Ok(Self {
            path: Some(path),
            entries,
        })
    }

    /// A store that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.entries
            .get(key)
            .map(|value| {
                serde_json::from_value(value.clone())
                    .map_err(|e| ClientError::Storage(format!("Malformed value for {key}: {e}")))
            })
            .transpose()
    }

    pub fn set<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)
            .map_err(|e| ClientError::Storage(format!("Cannot encode {key}: {e}")))?;
        self.entries.insert(key.to_string(), value);
        self.flush()
    }

    pub fn remove(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let raw = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| ClientError::Storage(e.to_string()))?;
        // Write-then-rename: the state file is never half-written.
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bork_core::Address;

    fn scratch_file(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "bork-client-{}-{}.json",
            name,
            std::process::id()
        ));
        let _ = fs::remove_file(&path);
        path
    }

    #[test]
    fn test_values_survive_reopen() {
        let path = scratch_file("reopen");
        let address = Address::parse("0x1111111111111111111111111111111111111111").unwrap();

        let mut store = LocalStore::open(&path).unwrap();
        store.set(WALLET_KEY, &address).unwrap();
        store.set(TASKS_KEY, &vec!["1", "2"]).unwrap();

        let reopened = LocalStore::open(&path).unwrap();
        assert_eq!(reopened.get::<Address>(WALLET_KEY).unwrap(), Some(address));
        assert_eq!(
            reopened.get::<Vec<String>>(TASKS_KEY).unwrap(),
            Some(vec!["1".to_string(), "2".to_string()])
        );

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_remove_key() {
        let path = scratch_file("remove");
        let mut store = LocalStore::open(&path).unwrap();
        store.set(USER_KEY, &"pup").unwrap();
        store.remove(USER_KEY).unwrap();

        let reopened = LocalStore::open(&path).unwrap();
        assert_eq!(reopened.get::<String>(USER_KEY).unwrap(), None);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_corrupt_file_is_storage_error() {
        let path = scratch_file("corrupt");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            LocalStore::open(&path),
            Err(ClientError::Storage(_))
        ));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_in_memory_store() {
        let mut store = LocalStore::in_memory();
        store.set(USER_KEY, &42).unwrap();
        assert_eq!(store.get::<i64>(USER_KEY).unwrap(), Some(42));
        assert_eq!(store.get::<i64>(TASKS_KEY).unwrap(), None);
    }
}
