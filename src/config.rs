//! Configuration for the index manager.
//!
//! ```
//! use symdex::config::SymdexConfig;
//!
//! let config = SymdexConfig::in_memory();
//! assert!(config.store.directory.is_none());
//! assert!(config.validate().is_ok());
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SymdexError};
use crate::search::WaitPolicy;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SymdexConfig {
    /// Index store settings.
    pub store: StoreConfig,

    /// Job scheduler settings.
    pub scheduler: SchedulerConfig,

    /// Search engine settings.
    pub search: SearchConfig,
}

impl SymdexConfig {
    /// A configuration whose segments live only in memory.
    pub fn in_memory() -> Self {
        SymdexConfig::default()
    }

    /// A configuration persisting segments under `directory`.
    pub fn with_directory<P: Into<PathBuf>>(directory: P) -> Self {
        let mut config = SymdexConfig::default();
        config.store.directory = Some(directory.into());
        config
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            SymdexError::config(format!("Failed to read {}: {e}", path.display()))
        })?;
        let config: SymdexConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that cannot be expressed in the type system.
    pub fn validate(&self) -> Result<()> {
        if self.scheduler.thread_name.trim().is_empty() {
            return Err(SymdexError::config("scheduler.thread_name must not be empty"));
        }
        if self.scheduler.retry_backoff_ms > 60_000 {
            return Err(SymdexError::config(format!(
                "scheduler.retry_backoff_ms too large: {}",
                self.scheduler.retry_backoff_ms
            )));
        }
        if let Some(dir) = &self.store.directory {
            if dir.as_os_str().is_empty() {
                return Err(SymdexError::config("store.directory must not be empty"));
            }
        }
        Ok(())
    }
}

/// Index store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding segment files. `None` keeps segments in memory only.
    pub directory: Option<PathBuf>,

    /// Sync segment files to disk before they are renamed into place.
    pub sync_writes: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            directory: None,
            sync_writes: true,
        }
    }
}

/// Job scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Name of the dedicated scheduler thread.
    pub thread_name: String,

    /// Sleep applied after a job is re-queued because it was not ready.
    pub retry_backoff_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            thread_name: "symdex-indexer".to_string(),
            retry_backoff_ms: 1,
        }
    }
}

/// Search engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// How `search` synchronises with pending indexing jobs.
    pub wait_policy: WaitPolicy,
}
