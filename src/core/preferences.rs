//! # Preference Storage
//!
//! Small string key/value store for UI preferences (currently only the
//! theme). The file-backed store keeps a JSON object at
//! `~/.lectern/preferences.json`; writes go through `.tmp` + `rename()`.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use log::{debug, warn};

#[derive(Debug)]
pub enum PreferenceError {
    Io(io::Error),
    Serialize(serde_json::Error),
}

impl fmt::Display for PreferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreferenceError::Io(e) => write!(f, "preference I/O error: {e}"),
            PreferenceError::Serialize(e) => write!(f, "preference encoding error: {e}"),
        }
    }
}

impl std::error::Error for PreferenceError {}

pub trait PreferenceStore: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError>;
}

/// Returns `~/.lectern/preferences.json`.
pub fn preferences_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".lectern").join("preferences.json"))
}

pub struct FilePreferenceStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FilePreferenceStore {
    /// Opens the store at `path`. A missing file is an empty store; an
    /// unreadable or corrupt one is reported as an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PreferenceError> {
        let path = path.into();
        let values = if path.exists() {
            let json = fs::read_to_string(&path).map_err(PreferenceError::Io)?;
            serde_json::from_str(&json).map_err(PreferenceError::Serialize)?
        } else {
            BTreeMap::new()
        };
        debug!("Preferences opened at {} ({} keys)", path.display(), values.len());
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), PreferenceError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(PreferenceError::Io)?;
        }
        let tmp_path = self.path.with_extension("tmp");
        let json = serde_json::to_string_pretty(&self.values).map_err(PreferenceError::Serialize)?;
        fs::write(&tmp_path, json).map_err(PreferenceError::Io)?;
        fs::rename(&tmp_path, &self.path).map_err(PreferenceError::Io)?;
        Ok(())
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.values.insert(key.to_string(), value.to_string());
        self.flush()
    }
}

/// In-process store. Clones share the same map, so a clone outlives the
/// controller that wrote to it.
#[derive(Clone, Default)]
pub struct MemoryPreferenceStore {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.values.lock() {
            Ok(values) => values.get(key).cloned(),
            Err(_) => None,
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        match self.values.lock() {
            Ok(mut values) => {
                values.insert(key.to_string(), value.to_string());
            }
            Err(_) => warn!("Preference map poisoned, dropping {}", key),
        }
        Ok(())
    }
}

/// Opens the file store at `path`, falling back to memory (preferences then
/// last only for this run) when the file cannot be used.
pub fn open_or_memory(path: Option<PathBuf>) -> Box<dyn PreferenceStore> {
    let Some(path) = path else {
        warn!("No home directory; preferences will not persist");
        return Box::new(MemoryPreferenceStore::default());
    };
    match FilePreferenceStore::open(&path) {
        Ok(store) => Box::new(store),
        Err(e) => {
            warn!("Cannot use {}: {}; preferences will not persist", path.display(), e);
            Box::new(MemoryPreferenceStore::default())
        }
    }
}
