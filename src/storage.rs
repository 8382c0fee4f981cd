use crate::errors::StoreError;
use std::{
    collections::{BTreeMap, HashMap},
    fs,
    io::Write,
    path::PathBuf,
};
use tracing::error;

pub const START_KEY: &str = "countdownStartDate";
pub const CYCLE_KEY: &str = "cycleNumber";

/// Synchronous string key-value store scoped to one display.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Writes several keys as one update where the backend supports it.
    fn set_many(&mut self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// JSON object on disk. Every read goes back to the file so edits made by
/// other processes are picked up on the next tick. Writes go to a sibling
/// temp file that is renamed over the store, so a reader never sees a
/// half-written object.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "store".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn replace(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let payload = serde_json::to_vec_pretty(entries)?;
        let temp = self.temp_path();
        let mut file = fs::File::create(&temp)?;
        file.write_all(&payload)?;
        file.sync_all()?;
        drop(file);
        fs::rename(&temp, &self.path)?;
        Ok(())
    }

    fn load(&self) -> BTreeMap<String, String> {
        match fs::read(&self.path) {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(entries) => entries,
                Err(err) => {
                    error!("failed to parse store file {}: {err}", self.path.display());
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                error!("failed to read store file {}: {err}", self.path.display());
                BTreeMap::new()
            }
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.load().remove(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.set_many(&[(key, value)])
    }

    fn set_many(&mut self, updates: &[(&str, &str)]) -> Result<(), StoreError> {
        let mut entries = self.load();
        for (key, value) in updates {
            entries.insert(key.to_string(), value.to_string());
        }
        self.replace(&entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unique_path(name: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!("cycle_countdown_{name}_{}_{nanos}.json", std::process::id()));
        path
    }

    #[test]
    fn memory_store_round_trips_values() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get(CYCLE_KEY), None);
        store.set(CYCLE_KEY, "4").unwrap();
        assert_eq!(store.get(CYCLE_KEY).as_deref(), Some("4"));
    }

    #[test]
    fn file_store_missing_file_reads_as_absent() {
        let store = FileStore::new(unique_path("missing"));
        assert_eq!(store.get(START_KEY), None);
    }

    #[test]
    fn file_store_keeps_other_keys_on_set() {
        let path = unique_path("keys");
        let mut store = FileStore::new(&path);
        store.set(START_KEY, "2026-01-01T00:00:00.000Z").unwrap();
        store.set(CYCLE_KEY, "2").unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get(START_KEY).as_deref(), Some("2026-01-01T00:00:00.000Z"));
        assert_eq!(reopened.get(CYCLE_KEY).as_deref(), Some("2"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn file_store_sees_external_edits() {
        let path = unique_path("external");
        let mut store = FileStore::new(&path);
        store.set(CYCLE_KEY, "1").unwrap();

        fs::write(&path, r#"{"cycleNumber": "7"}"#).unwrap();
        assert_eq!(store.get(CYCLE_KEY).as_deref(), Some("7"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn file_store_writes_both_keys_at_once_and_leaves_no_temp_file() {
        let path = unique_path("many");
        let mut store = FileStore::new(&path);
        store
            .set_many(&[(START_KEY, "2026-02-01T00:00:00.000Z"), (CYCLE_KEY, "5")])
            .unwrap();

        let stored: BTreeMap<String, String> =
            serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[CYCLE_KEY], "5");
        assert!(!store.temp_path().exists());
        let _ = fs::remove_file(path);
    }

    #[test]
    fn file_store_ignores_interrupted_write_next_to_valid_record() {
        let path = unique_path("interrupted");
        let mut store = FileStore::new(&path);
        store
            .set_many(&[(START_KEY, "2026-02-01T00:00:00.000Z"), (CYCLE_KEY, "7")])
            .unwrap();

        // A write that died before its rename leaves only a partial temp file.
        fs::write(store.temp_path(), r#"{"countdownStartDate": "2026-"#).unwrap();
        assert_eq!(store.get(CYCLE_KEY).as_deref(), Some("7"));

        store.set(CYCLE_KEY, "8").unwrap();
        assert_eq!(store.get(CYCLE_KEY).as_deref(), Some("8"));
        assert_eq!(store.get(START_KEY).as_deref(), Some("2026-02-01T00:00:00.000Z"));
        assert!(!store.temp_path().exists());
        let _ = fs::remove_file(path);
    }

    #[test]
    fn file_store_garbage_reads_as_empty_and_is_overwritten() {
        let path = unique_path("garbage");
        fs::write(&path, "not json").unwrap();
        let mut store = FileStore::new(&path);
        assert_eq!(store.get(CYCLE_KEY), None);

        store.set(CYCLE_KEY, "3").unwrap();
        assert_eq!(store.get(CYCLE_KEY).as_deref(), Some("3"));
        let _ = fs::remove_file(path);
    }
}
