//! Simulation configuration loaded from JSON.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{read_json, ConfigError};
use crate::logging::TracingConfig;
use crate::physics::Tuning;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub tuning: Tuning,
    /// Freeze fighters in the editor preview pose with no fades
    pub editor_mode: bool,
    /// Directory of fighter JSON files to watch for changes
    pub watch_dir: Option<PathBuf>,
    pub tracing: TracingConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tuning: Tuning::default(),
            editor_mode: false,
            watch_dir: None,
            tracing: TracingConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config: SimConfig = read_json(path)?;
        config.validate()?;
        tracing::info!(path = %path.display(), "loaded simulation config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tuning.validate()?;
        self.tracing.validate()
    }

    pub fn tick_rate(&self) -> f32 {
        self.tuning.tick_rate
    }
}
