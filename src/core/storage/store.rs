//=========================================================================
// Key/Value Store
//=========================================================================
//
// Durable, synchronous, string-keyed storage shared by the engine (high
// scores), the audio manager (preferences) and `GameStorage`.
//
// Implementations:
//   MemoryStore   process-local map, the default for headless runs
//   FileStore     one JSON object on disk, written through on each change
//
// Stores take `&self` and use interior mutability so a single store can
// be shared as `Rc<dyn KeyValueStore>` between components.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use directories::ProjectDirs;
use log::{debug, warn};
use thiserror::Error;

//=== StoreError ==========================================================

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed for {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode storage contents: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("could not determine a data directory for this platform")]
    NoDataDir,

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

//=== KeyValueStore =======================================================

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    /// Removing an absent key succeeds.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
    fn keys(&self) -> Result<Vec<String>, StoreError>;
}

/// Store handle shared between the components of one game session.
pub type SharedStore = Rc<dyn KeyValueStore>;

//=== MemoryStore =========================================================

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedStore {
        Rc::new(Self::new())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.entries.borrow().keys().cloned().collect())
    }
}

//=== FileStore ===========================================================

/// JSON-file store. The whole map is rewritten (temp file + rename) on
/// every mutation, so the file is always a complete snapshot.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: RefCell<BTreeMap<String, String>>,
}

impl FileStore {
    const FILE_NAME: &'static str = "storage.json";

    /// Opens (or lazily creates) the store at `path`. A corrupt file is
    /// logged and treated as empty; it is replaced on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let entries = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!(target: "storage", "Ignoring corrupt store {:?}: {}", path, err);
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        debug!(target: "storage", "Opened {:?} with {} key(s)", path, entries.len());
        Ok(Self {
            path,
            entries: RefCell::new(entries),
        })
    }

    /// Opens `storage.json` in the per-user data directory for `app`.
    pub fn open_default(app: &str) -> Result<Self, StoreError> {
        let dirs = ProjectDirs::from("io", "arcade", app).ok_or(StoreError::NoDataDir)?;
        Self::open(dirs.data_dir().join(Self::FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `entries` to disk. The in-memory map is only replaced by the
    /// caller once this succeeds.
    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let contents = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut next = self.entries.borrow().clone();
        next.insert(key.to_string(), value.to_string());
        self.flush(&next)?;
        *self.entries.borrow_mut() = next;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        if !self.entries.borrow().contains_key(key) {
            return Ok(());
        }
        let mut next = self.entries.borrow().clone();
        next.remove(key);
        self.flush(&next)?;
        *self.entries.borrow_mut() = next;
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.entries.borrow().keys().cloned().collect())
    }
}

//=========================================================================
// Tests
//=========================================================================
