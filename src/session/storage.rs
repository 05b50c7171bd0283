use crate::error::{NexoraError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Trait for durable key-value slots holding one serialized blob
pub trait StateStorage: Send + Sync {
    /// Read the stored blob, `None` if nothing was saved yet
    fn load(&self) -> Result<Option<String>>;

    /// Replace the stored blob
    fn save(&self, contents: &str) -> Result<()>;

    /// Remove the stored blob
    fn clear(&self) -> Result<()>;
}

/// Process-local slot for tests; `set_fail_writes` simulates a full disk.
#[derive(Default)]
pub struct MemoryStorage {
    slot: Mutex<Option<String>>,
    fail_writes: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(contents.into())),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make every subsequent `save`/`clear` fail, simulating a full disk.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn contents(&self) -> Option<String> {
        self.slot.lock().map(|slot| slot.clone()).unwrap_or(None)
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(NexoraError::PersistenceError(
                "storage quota exceeded".to_string(),
            ));
        }
        Ok(())
    }
}

impl StateStorage for MemoryStorage {
    fn load(&self) -> Result<Option<String>> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| NexoraError::PersistenceError("storage lock poisoned".to_string()))?;
        Ok(slot.clone())
    }

    fn save(&self, contents: &str) -> Result<()> {
        self.check_writable()?;
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| NexoraError::PersistenceError("storage lock poisoned".to_string()))?;
        *slot = Some(contents.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.check_writable()?;
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| NexoraError::PersistenceError("storage lock poisoned".to_string()))?;
        *slot = None;
        Ok(())
    }
}
