use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::document::Document;
use crate::error::{StoreError, StoreResult};
use crate::traits::DocumentStore;

/// Document store backed by a single JSON file.
///
/// A process-wide `RwLock` guards the file: loads share it, writes and
/// read-modify-write sequences hold it exclusively. Nothing is cached; every
/// call goes to disk.
///
/// Writes land in a temporary file next to the target which is then renamed
/// over it, so readers and crashes only ever see a complete document.
pub struct JsonFileStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl JsonFileStore {
    /// Create a store for `path` without touching the filesystem.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    /// Create a store and make sure its backing file exists.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let store = Self::new(path);
        store.ensure_exists()?;
        Ok(store)
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> StoreResult<Document> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::Missing(self.path.clone()))
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&bytes).map_err(|e| StoreError::Decode(e.to_string()))
    }

    fn write_document(&self, document: &Document) -> StoreResult<()> {
        let bytes = serde_json::to_vec(document).map_err(|e| StoreError::Encode(e.to_string()))?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;

        debug!(
            path = %self.path.display(),
            bytes = bytes.len(),
            posts = document.posts.len(),
            accounts = document.accounts.len(),
            "document written"
        );
        Ok(())
    }
}

// The guarded value is `()` and the file is replaced atomically, so a panic
// while the lock was held cannot leave a half-written document behind.
// Poisoning is therefore ignored.
impl DocumentStore for JsonFileStore {
    fn ensure_exists(&self) -> StoreResult<()> {
        let _guard = self.lock.write().unwrap_or_else(PoisonError::into_inner);
        if self.path.try_exists()? {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        self.write_document(&Document::new())?;
        info!(path = %self.path.display(), "created empty document");
        Ok(())
    }

    fn load(&self) -> StoreResult<Document> {
        let _guard = self.lock.read().unwrap_or_else(PoisonError::into_inner);
        self.read_document()
    }

    fn replace(&self, document: &Document) -> StoreResult<()> {
        let _guard = self.lock.write().unwrap_or_else(PoisonError::into_inner);
        self.write_document(document)
    }

    fn update<T, F>(&self, mutate: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Document) -> StoreResult<T>,
    {
        let _guard = self.lock.write().unwrap_or_else(PoisonError::into_inner);
        let mut document = self.read_document()?;
        let output = mutate(&mut document)?;
        self.write_document(&document)?;
        Ok(output)
    }
}

impl std::fmt::Debug for JsonFileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonFileStore")
            .field("path", &self.path)
            .finish()
    }
}
