//! Durable key-value layer behind the event store.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{PhotocalError, PhotocalResult};

/// A flat string-to-string store. Each key is a named slot.
pub trait KeyValue: Send + Sync {
    fn get(&self, key: &str) -> PhotocalResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> PhotocalResult<()>;
}

/// Slots stored as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileKeyValue {
    dir: PathBuf,
}

impl FileKeyValue {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileKeyValue { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValue for FileKeyValue {
    fn get(&self, key: &str) -> PhotocalResult<Option<String>> {
        let path = self.path_for(key);

        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PhotocalError::Storage(format!(
                "Could not read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn set(&self, key: &str, value: &str) -> PhotocalResult<()> {
        std::fs::create_dir_all(&self.dir)?;

        let path = self.path_for(key);
        let temp = self.dir.join(format!("{}.json.tmp", key));

        std::fs::write(&temp, value)?;
        if let Err(e) = std::fs::rename(&temp, &path) {
            let _ = std::fs::remove_file(&temp);
            return Err(PhotocalError::Storage(format!(
                "Could not replace {}: {}",
                path.display(),
                e
            )));
        }
        Ok(())
    }
}

/// In-process slots, lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryKeyValue {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValue {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValue for MemoryKeyValue {
    fn get(&self, key: &str) -> PhotocalResult<Option<String>> {
        let slots = self
            .slots
            .lock()
            .map_err(|_| PhotocalError::Storage("key-value lock poisoned".into()))?;
        Ok(slots.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> PhotocalResult<()> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| PhotocalError::Storage("key-value lock poisoned".into()))?;
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_slot_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let kv = FileKeyValue::new(dir.path().join("nested"));

        assert_eq!(kv.get("slot").unwrap(), None);

        kv.set("slot", "[1,2,3]").unwrap();
        assert_eq!(kv.get("slot").unwrap().as_deref(), Some("[1,2,3]"));
        assert!(kv.path_for("slot").exists());
        assert!(!dir.path().join("nested/slot.json.tmp").exists());

        kv.set("slot", "[]").unwrap();
        assert_eq!(kv.get("slot").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn unreadable_slot_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let kv = FileKeyValue::new(dir.path());
        // A directory where the slot file should be
        std::fs::create_dir_all(kv.path_for("slot")).unwrap();

        assert!(matches!(kv.get("slot"), Err(PhotocalError::Storage(_))));
    }

    #[test]
    fn failed_replace_removes_the_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let kv = FileKeyValue::new(dir.path());
        // A non-empty directory can't be replaced by a file
        std::fs::create_dir_all(kv.path_for("slot").join("child")).unwrap();

        assert!(matches!(kv.set("slot", "[]"), Err(PhotocalError::Storage(_))));
        assert!(!dir.path().join("slot.json.tmp").exists());
    }

    #[test]
    fn memory_slots_are_independent() {
        let kv = MemoryKeyValue::new();
        kv.set("a", "1").unwrap();
        kv.set("b", "2").unwrap();

        assert_eq!(kv.get("a").unwrap().as_deref(), Some("1"));
        assert_eq!(kv.get("b").unwrap().as_deref(), Some("2"));
        assert_eq!(kv.get("c").unwrap(), None);
    }
}
