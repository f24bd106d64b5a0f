//! Runtime settings
//!
//! Persisted as a JSON file. Missing fields take their defaults, and a
//! missing or unreadable file falls back to `Settings::default()`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::TICK_MS;
use crate::persistence::StoreError;
use crate::sim::Viewport;

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Scheduler period in milliseconds
    pub tick_interval_ms: u64,
    /// Fixed RNG seed; a fresh one is drawn per session when absent
    pub seed: Option<u64>,
    /// Where the score ledger lives; in-memory when absent
    pub storage_path: Option<PathBuf>,

    // === Headless runner ===
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// Stop the demo after this many sessions
    pub demo_sessions: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_interval_ms: TICK_MS,
            seed: None,
            storage_path: None,
            viewport_width: 1080.0,
            viewport_height: 2400.0,
            demo_sessions: 1,
        }
    }
}

impl Settings {
    /// Tick period (never zero)
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.viewport_width, self.viewport_height)
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring malformed settings {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(self).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Settings saved");
        Ok(())
    }
}
