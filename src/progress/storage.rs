//! Progress persistence
//!
//! The whole aggregate is stored as one versioned JSON document under a
//! single key. Backends only move strings; versioning and migration live
//! here.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::migrations::{CURRENT_SCHEMA_VERSION, migrate};
use super::model::UserProgress;
use crate::config::Config;
use crate::error::{Result, StorageError};

/// Key the progress document is stored under
pub const PROGRESS_KEY: &str = "dojo-progress";

/// Key-value document storage
pub trait Storage {
    /// Read a document, `None` if it was never written
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replace a document
    fn write(&mut self, key: &str, contents: &str) -> Result<()>;

    /// Move a document out from under its key, keeping its contents
    ///
    /// The copy is kept under a name derived from `key` and `tag`; the
    /// returned string says where it went.
    fn set_aside(&mut self, key: &str, tag: &str) -> Result<String>;
}

/// Documents as `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Storage in the platform data directory
    pub fn in_data_dir() -> Result<Self> {
        let dir = Config::data_dir().map_err(|_| StorageError::NoDataDir)?;
        Ok(Self::new(dir))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing a key
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path).map(Some).map_err(|e| StorageError::io(&path, e))
    }

    fn write(&mut self, key: &str, contents: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| StorageError::io(&self.dir, e))?;

        // Write then rename so a crash never leaves a half-written document
        let path = self.path_for(key);
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        fs::write(&tmp, contents).map_err(|e| StorageError::io(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| StorageError::io(&path, e))
    }

    fn set_aside(&mut self, key: &str, tag: &str) -> Result<String> {
        let path = self.path_for(key);
        let target = self.dir.join(format!("{key}.json.corrupt-{tag}"));
        fs::rename(&path, &target).map_err(|e| StorageError::io(&path, e))?;
        Ok(target.display().to_string())
    }
}

/// In-memory documents, for tests and throwaway sessions
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    documents: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with one document
    pub fn with_document(key: &str, contents: impl Into<String>) -> Self {
        let mut documents = HashMap::new();
        documents.insert(key.to_string(), contents.into());
        Self { documents }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.documents.get(key).map(String::as_str)
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.documents.get(key).cloned())
    }

    fn write(&mut self, key: &str, contents: &str) -> Result<()> {
        self.documents.insert(key.to_string(), contents.to_string());
        Ok(())
    }

    fn set_aside(&mut self, key: &str, tag: &str) -> Result<String> {
        let target = format!("{key}.corrupt-{tag}");
        let contents = self.documents.remove(key).ok_or_else(|| {
            StorageError::io(key, std::io::Error::from(std::io::ErrorKind::NotFound))
        })?;
        self.documents.insert(target.clone(), contents);
        Ok(target)
    }
}

#[derive(Serialize)]
struct DocumentRef<'a> {
    version: u32,
    state: StateRef<'a>,
}

#[derive(Serialize)]
struct StateRef<'a> {
    progress: &'a UserProgress,
}

/// Serialize progress into a versioned document
pub fn encode(progress: &UserProgress) -> Result<String> {
    let document = DocumentRef { version: CURRENT_SCHEMA_VERSION, state: StateRef { progress } };
    Ok(serde_json::to_string_pretty(&document)?)
}

#[derive(Deserialize)]
struct RawDocument {
    #[serde(default)]
    version: u32,
    #[serde(default)]
    state: RawState,
}

#[derive(Default, Deserialize)]
struct RawState {
    #[serde(default)]
    progress: Option<Value>,
}

/// Parse a stored document, migrating it to the current schema
///
/// A document without a `version` is treated as version 0. Documents from
/// a newer version are read as-is; unknown fields are ignored.
pub fn decode(contents: &str) -> Result<UserProgress> {
    let raw: RawDocument = serde_json::from_str(contents)?;
    let mut progress = raw.state.progress.unwrap_or_else(|| Value::Object(Default::default()));

    if raw.version > CURRENT_SCHEMA_VERSION {
        tracing::warn!(
            stored = raw.version,
            current = CURRENT_SCHEMA_VERSION,
            "Progress was written by a newer version; loading what is understood"
        );
    } else if raw.version < CURRENT_SCHEMA_VERSION {
        migrate(&mut progress, raw.version)?;
    }

    let mut progress: UserProgress = serde_json::from_value(progress)?;
    progress.sync_mastery_levels();
    Ok(progress)
}

/// Load progress from storage; `None` if nothing was stored yet
pub fn load<S: Storage>(storage: &S) -> Result<Option<UserProgress>> {
    storage.read(PROGRESS_KEY)?.map(|contents| decode(&contents)).transpose()
}

/// Write progress to storage
pub fn save<S: Storage>(storage: &mut S, progress: &UserProgress) -> Result<()> {
    let contents = encode(progress)?;
    storage.write(PROGRESS_KEY, &contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn memory_storage_round_trips_progress() {
        let mut storage = MemoryStorage::new();
        let mut progress = UserProgress::default();
        progress.add_xp(300);

        save(&mut storage, &progress).unwrap();
        let loaded = load(&storage).unwrap().unwrap();
        assert_eq!(loaded, progress);
    }

    #[test]
    fn empty_storage_loads_nothing() {
        assert!(load(&MemoryStorage::new()).unwrap().is_none());
    }

    #[test]
    fn encoded_document_is_versioned() {
        let json = encode(&UserProgress::default()).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], CURRENT_SCHEMA_VERSION);
        assert_eq!(value["state"]["progress"]["userId"], "guest");
    }

    #[test]
    fn unversioned_document_is_migrated() {
        let doc = r#"{"state":{"progress":{"totalXp":500,"level":3,"completedLessons":["py-fund-1"]}}}"#;
        let progress = decode(doc).unwrap();
        assert_eq!(progress.total_xp, 500);
        assert_eq!(progress.completed_lessons, vec!["py-fund-1"]);
        assert!(progress.review_schedule.is_empty());
        assert!(progress.lesson_stats.is_empty());
    }

    #[test]
    fn newer_document_still_loads() {
        let doc = r#"{"version":99,"state":{"progress":{"totalXp":10,"futureField":{"a":1}}}}"#;
        let progress = decode(doc).unwrap();
        assert_eq!(progress.total_xp, 10);
    }

    #[test]
    fn corrupt_document_is_an_error() {
        let err = decode("{not json").unwrap_err();
        assert!(err.is_corrupt_document());
    }

    #[test]
    fn file_storage_writes_under_key() {
        let temp_dir = TempDir::new().unwrap();
        let mut storage = FileStorage::new(temp_dir.path().join("nested"));

        assert_eq!(storage.read("k").unwrap(), None);
        storage.write("k", "{}").unwrap();
        assert_eq!(storage.read("k").unwrap().as_deref(), Some("{}"));
        assert!(storage.path_for("k").exists());
        assert!(!temp_dir.path().join("nested/k.json.tmp").exists());
    }

    #[test]
    fn file_storage_sets_documents_aside() {
        let temp_dir = TempDir::new().unwrap();
        let mut storage = FileStorage::new(temp_dir.path());
        storage.write("k", "{broken").unwrap();

        let moved = storage.set_aside("k", "20260301T120000Z").unwrap();
        assert_eq!(storage.read("k").unwrap(), None);
        assert_eq!(fs::read_to_string(&moved).unwrap(), "{broken");
        assert!(moved.ends_with("k.json.corrupt-20260301T120000Z"));
    }

    #[test]
    fn setting_aside_a_missing_document_fails() {
        let mut storage = MemoryStorage::new();
        assert!(storage.set_aside("k", "t").is_err());
    }
}
