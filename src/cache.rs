//! Persistent key-value cache backing requirement answers and run metadata.
//!
//! The on-disk form is a single JSON object of strings that is read and
//! rewritten whole on every access. There is no locking: two runs writing the
//! same cache concurrently race and the last writer wins.
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::CacheError;

/// File name of the cache inside an output directory.
pub const CACHE_FILE_NAME: &str = ".secrets";

/// Cache key holding the output directory of the last setup.
pub const KEY_OUT_DIR: &str = "out_dir";

/// Cache key holding the template repository path of the last setup.
pub const KEY_REPOSITORY_PATH: &str = "repository_path";

/// Return the cache file path for an output directory.
#[must_use]
pub fn cache_file_path(out_dir: &Path) -> PathBuf {
    out_dir.join(CACHE_FILE_NAME)
}

/// String-keyed persistent store.
#[cfg_attr(test, mockall::automock)]
pub trait Store {
    /// Read the whole mapping.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read or decoded.
    fn read(&self) -> Result<BTreeMap<String, String>, CacheError>;

    /// Insert or overwrite a single entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read or written.
    fn write(&self, key: &str, value: &str) -> Result<(), CacheError>;

    /// Look up a single entry.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Store::read`].
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.read()?.get(key).cloned())
    }
}

/// [`Store`] persisted as a JSON object in a single file.
///
/// A missing file reads as an empty mapping and is created on first write.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store located in the given output directory.
    #[must_use]
    pub fn in_dir(out_dir: &Path) -> Self {
        Self::new(cache_file_path(out_dir))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn unavailable(&self, source: io::Error) -> CacheError {
        CacheError::Unavailable {
            path: self.path.clone(),
            source,
        }
    }
}

impl Store for FileStore {
    fn read(&self) -> Result<BTreeMap<String, String>, CacheError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(self.unavailable(e)),
        };
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).map_err(|source| CacheError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn write(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let mut entries = self.read()?;
        entries.insert(key.to_string(), value.to_string());
        let mut encoded =
            serde_json::to_string_pretty(&entries).map_err(|source| CacheError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
        encoded.push('\n');
        fs::write(&self.path, encoded).map_err(|e| self.unavailable(e))
    }
}

/// In-memory [`Store`], used where nothing should persist.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `entries`.
    #[must_use]
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            entries: RefCell::new(map),
        }
    }
}

impl Store for MemoryStore {
    fn read(&self) -> Result<BTreeMap<String, String>, CacheError> {
        Ok(self.entries.borrow().clone())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
