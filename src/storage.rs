use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::StorageError;

/// Durable document storage keyed by logical document name
pub trait Store {
    /// Load a document, `None` when it has never been written
    fn load(&self, name: &str) -> Result<Option<Value>, StorageError>;

    /// Write a document, replacing any previous version
    fn save(&self, name: &str, doc: &Value) -> Result<(), StorageError>;

    /// Write a document that must not exist yet
    fn save_new(&self, name: &str, doc: &Value) -> Result<(), StorageError>;
}

/// JSON files under a single data directory, one `<name>.json` per document
#[derive(Debug, Clone)]
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `base_path`, creating the directory if needed
    pub fn new<P: AsRef<Path>>(base_path: P) -> Result<Self, StorageError> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    fn document_path(&self, name: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", name))
    }
}

impl Store for FileStore {
    fn load(&self, name: &str) -> Result<Option<Value>, StorageError> {
        let path = self.document_path(name);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        // Invalid UTF-8 surfaces as a JSON error, like any other corrupt content.
        let doc = serde_json::from_slice(&bytes)?;
        Ok(Some(doc))
    }

    fn save(&self, name: &str, doc: &Value) -> Result<(), StorageError> {
        let path = self.document_path(name);
        let tmp_path = self.base_path.join(format!(".{}.json.tmp", name));
        let json = serde_json::to_string_pretty(doc)?;

        // Readers only ever see the old or the new document.
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    fn save_new(&self, name: &str, doc: &Value) -> Result<(), StorageError> {
        let path = self.document_path(name);
        let json = serde_json::to_string_pretty(doc)?;

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(StorageError::AlreadyExists(path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        Ok(())
    }
}
