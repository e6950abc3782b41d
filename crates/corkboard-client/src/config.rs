//! Application configuration resolved from environment variables.
//!
//! All settings have sensible defaults so the client can start with zero
//! configuration. The storage backend is decided here, once, and injected;
//! nothing downstream re-detects the environment per call.

use std::path::{Path, PathBuf};

use corkboard_shared::constants::DB_FILE_NAME;
use corkboard_store::BackendKind;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Which storage backend to run against.
    /// Env: `CORKBOARD_BACKEND` (`local` / `bridged`)
    /// Default: `Local`
    pub backend: BackendKind,

    /// Directory holding the record store. `None` means the platform data
    /// directory.
    /// Env: `CORKBOARD_DATA_DIR`
    /// Default: `None`
    pub data_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Local,
            data_dir: None,
        }
    }
}

impl AppConfig {
    /// Read configuration from the environment, falling back to defaults
    /// for anything unset or unparsable.
    pub fn from_env() -> Self {
        let backend = match std::env::var("CORKBOARD_BACKEND").as_deref() {
            Ok("bridged") => BackendKind::Bridged,
            Ok("local") | Err(_) => BackendKind::Local,
            Ok(other) => {
                tracing::warn!(value = other, "unknown CORKBOARD_BACKEND, using local");
                BackendKind::Local
            }
        };

        let data_dir = std::env::var("CORKBOARD_DATA_DIR").ok().map(PathBuf::from);

        Self { backend, data_dir }
    }

    /// Path of the record store file, when an explicit data directory is
    /// configured.
    pub fn db_path(&self) -> Option<PathBuf> {
        self.data_dir.as_deref().map(|d: &Path| d.join(DB_FILE_NAME))
    }
}
