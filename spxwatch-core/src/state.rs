//! Alert state and its persistence.
//!
//! The state is a small record (last alert time and price). Absence of the
//! record means cold start. A record that cannot be read is reported as an
//! error by the store; callers fall back to cold start via
//! [`load_or_cold_start`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("state file I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("state file {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },
}

/// Last confirmed alert. Both fields are `None` at cold start.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AlertState {
    pub last_alert_time: Option<DateTime<FixedOffset>>,
    pub last_alert_price: Option<f64>,
}

impl AlertState {
    pub fn new(time: DateTime<FixedOffset>, price: f64) -> Self {
        Self {
            last_alert_time: Some(time),
            last_alert_price: Some(price),
        }
    }

    pub fn is_cold(&self) -> bool {
        self.last_alert_time.is_none()
    }
}

/// On-disk record: the state plus a wall-clock "last updated" stamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedAlertState {
    pub last_alert_time: Option<DateTime<FixedOffset>>,
    pub last_alert_price: Option<f64>,
    /// Informational only; kept as text so naive local stamps still load.
    #[serde(default)]
    pub updated: Option<String>,
}

/// Read/write handle for the persisted alert record.
pub trait AlertStore: Send {
    /// `Ok(None)` when no record exists.
    fn load(&self) -> Result<Option<AlertState>, StateError>;

    fn save(&mut self, state: &AlertState) -> Result<(), StateError>;

    /// Remove the record. Removing an absent record is not an error.
    fn clear(&mut self) -> Result<(), StateError>;
}

/// Load the persisted state, treating unreadable or corrupt records as cold start.
pub fn load_or_cold_start(store: &dyn AlertStore) -> AlertState {
    match store.load() {
        Ok(Some(state)) => state,
        Ok(None) => AlertState::default(),
        Err(e) => {
            tracing::warn!(error = %e, "could not load alert state; starting cold");
            AlertState::default()
        }
    }
}

/// JSON file store, compatible with ISO-8601 timestamps with offsets.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: io::Error) -> StateError {
        StateError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl AlertStore for JsonFileStore {
    fn load(&self) -> Result<Option<AlertState>, StateError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_err(e)),
        };

        let record: PersistedAlertState =
            serde_json::from_str(&content).map_err(|e| StateError::Corrupt {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        Ok(Some(AlertState {
            last_alert_time: record.last_alert_time,
            last_alert_price: record.last_alert_price,
        }))
    }

    fn save(&mut self, state: &AlertState) -> Result<(), StateError> {
        let record = PersistedAlertState {
            last_alert_time: state.last_alert_time,
            last_alert_price: state.last_alert_price,
            updated: Some(chrono::Local::now().fixed_offset().to_rfc3339()),
        };
        let json = serde_json::to_string_pretty(&record).map_err(|e| StateError::Corrupt {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }
        fs::write(&self.path, json).map_err(|e| self.io_err(e))?;
        tracing::debug!(path = %self.path.display(), "saved alert state");
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StateError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "deleted alert state");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_err(e)),
        }
    }
}

/// In-memory store. Clones share the same record, so a test can keep a
/// handle after moving the store into a deduplicator.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    record: Arc<Mutex<Option<AlertState>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: AlertState) -> Self {
        Self {
            record: Arc::new(Mutex::new(Some(state))),
        }
    }

    pub fn snapshot(&self) -> Option<AlertState> {
        *self.record.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AlertStore for MemoryStore {
    fn load(&self) -> Result<Option<AlertState>, StateError> {
        Ok(self.snapshot())
    }

    fn save(&mut self, state: &AlertState) -> Result<(), StateError> {
        *self.record.lock().unwrap_or_else(PoisonError::into_inner) = Some(*state);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StateError> {
        *self.record.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
