use super::storage::StateStorage;
use crate::error::{NexoraError, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Stores one blob per key as `<dir>/<key>.json`.
pub struct FilesystemStorage {
    dir: PathBuf,
    key: String,
}

impl FilesystemStorage {
    pub fn new(dir: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            key: key.into(),
        }
    }

    /// Storage under the user's cache directory (`~/.cache/nexora` on Linux)
    pub fn in_cache_dir(key: impl Into<String>) -> Result<Self> {
        Ok(Self::new(default_storage_dir()?, key))
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.key))
    }
}

pub fn default_storage_dir() -> Result<PathBuf> {
    dirs::cache_dir()
        .map(|dir| dir.join("nexora"))
        .ok_or_else(|| NexoraError::PersistenceError("no cache directory available".to_string()))
}

fn persistence_error(action: &str, path: &Path, err: std::io::Error) -> NexoraError {
    NexoraError::PersistenceError(format!("failed to {} {}: {}", action, path.display(), err))
}

impl StateStorage for FilesystemStorage {
    fn load(&self) -> Result<Option<String>> {
        let path = self.path();
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| persistence_error("read", &path, e))
    }

    fn save(&self, contents: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| persistence_error("create", &self.dir, e))?;

        // Each writer gets its own temp file; the rename decides the winner
        let mut temp = NamedTempFile::new_in(&self.dir)
            .map_err(|e| persistence_error("create", &self.dir, e))?;
        temp.write_all(contents.as_bytes())
            .and_then(|_| temp.as_file().sync_all())
            .map_err(|e| persistence_error("write", temp.path(), e))?;

        let path = self.path();
        temp.persist(&path)
            .map_err(|e| persistence_error("replace", &path, e.error))?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let path = self.path();
        if path.exists() {
            fs::remove_file(&path).map_err(|e| persistence_error("remove", &path, e))?;
        }
        Ok(())
    }
}
