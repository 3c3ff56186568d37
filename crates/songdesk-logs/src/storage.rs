//! Storage handles the order log reads and writes through

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

use crate::error::{LogError, Result};

/// Named-blob storage for daily spreadsheets
pub trait LogStorage: Send + Sync {
    /// Make the storage ready for writes (e.g. create the directory)
    fn prepare(&self) -> Result<()>;

    /// Read a file's bytes; `None` if it does not exist
    fn read(&self, name: &str) -> Result<Option<Vec<u8>>>;

    /// Replace a file's bytes, creating it if needed
    fn write(&self, name: &str, bytes: &[u8]) -> Result<()>;

    /// Human-readable location of a file, for logs and events
    fn locate(&self, name: &str) -> String;
}

/// Files in a directory on disk
#[derive(Debug, Clone)]
pub struct DirStorage {
    dir: PathBuf,
}

impl DirStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

impl LogStorage for DirStorage {
    fn prepare(&self) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(|e| LogError::io(&self.dir, e))?;
            debug!("Created log directory: {}", self.dir.display());
        }
        Ok(())
    }

    fn read(&self, name: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(name);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(LogError::io(path, e)),
        }
    }

    fn write(&self, name: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(name);
        fs::write(&path, bytes).map_err(|e| LogError::io(path, e))
    }

    fn locate(&self, name: &str) -> String {
        self.path(name).display().to_string()
    }
}

/// In-memory storage with the same contract as [`DirStorage`]
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: Mutex<HashMap<String, Vec<u8>>>,
    fail_writes: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage whose writes always fail
    pub fn failing() -> Self {
        let storage = Self::default();
        storage.set_fail_writes(true);
        storage
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Seed or overwrite a file directly
    pub fn insert(&self, name: impl Into<String>, bytes: Vec<u8>) {
        self.files.lock().insert(name.into(), bytes);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.lock().contains_key(name)
    }

    /// Names of all stored files, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.files.lock().keys().cloned().collect();
        names.sort();
        names
    }
}

impl LogStorage for MemoryStorage {
    fn prepare(&self) -> Result<()> {
        Ok(())
    }

    fn read(&self, name: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.files.lock().get(name).cloned())
    }

    fn write(&self, name: &str, bytes: &[u8]) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(LogError::io(
                format!("memory://{}", name),
                std::io::Error::new(ErrorKind::Other, "simulated write failure"),
            ));
        }
        self.files.lock().insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    fn locate(&self, name: &str) -> String {
        format!("memory://{}", name)
    }
}

impl<S: LogStorage + ?Sized> LogStorage for std::sync::Arc<S> {
    fn prepare(&self) -> Result<()> {
        (**self).prepare()
    }

    fn read(&self, name: &str) -> Result<Option<Vec<u8>>> {
        (**self).read(name)
    }

    fn write(&self, name: &str, bytes: &[u8]) -> Result<()> {
        (**self).write(name, bytes)
    }

    fn locate(&self, name: &str) -> String {
        (**self).locate(name)
    }
}
