//! Remembering the last entered duration across sessions

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{error::PersistenceError, format::validate_seconds};

/// Storage for the last duration a user started
pub trait Persistence: Send {
    fn save(&mut self, seconds: u32) -> Result<(), PersistenceError>;
    fn load(&self) -> Option<u32>;
}

/// On-disk record written by [`JsonFilePersistence`]
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SavedValue {
    seconds: u32,
    saved_at: DateTime<Utc>,
}

/// Keeps the last value in a small JSON file
#[derive(Debug, Clone)]
pub struct JsonFilePersistence {
    path: PathBuf,
}

impl JsonFilePersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File for a named timer inside a state directory
    pub fn for_timer(dir: &Path, name: &str) -> Self {
        Self::new(dir.join(format!("{}.json", name)))
    }

    /// Whether a value was ever saved here
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}

impl Persistence for JsonFilePersistence {
    fn save(&mut self, seconds: u32) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let record = SavedValue {
            seconds,
            saved_at: Utc::now(),
        };
        fs::write(&self.path, serde_json::to_vec_pretty(&record)?)?;

        debug!("Saved last value {} to {}", seconds, self.path.display());
        Ok(())
    }

    fn load(&self) -> Option<u32> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Failed to read {}: {}", self.path.display(), e);
                return None;
            }
        };

        let record: SavedValue = match serde_json::from_slice(&raw) {
            Ok(record) => record,
            Err(e) => {
                warn!("Ignoring corrupt state file {}: {}", self.path.display(), e);
                return None;
            }
        };

        match validate_seconds(i64::from(record.seconds)) {
            Ok(seconds) => Some(seconds),
            Err(e) => {
                warn!("Ignoring stored value in {}: {}", self.path.display(), e);
                None
            }
        }
    }
}

/// Keeps the last value for the lifetime of the process only
#[derive(Debug, Clone, Default)]
pub struct MemoryPersistence {
    value: Option<u32>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(seconds: u32) -> Self {
        Self { value: Some(seconds) }
    }
}

impl Persistence for MemoryPersistence {
    fn save(&mut self, seconds: u32) -> Result<(), PersistenceError> {
        self.value = Some(seconds);
        Ok(())
    }

    fn load(&self) -> Option<u32> {
        self.value
    }
}
