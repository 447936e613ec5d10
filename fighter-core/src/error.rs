//! Error types shared across the fighter core.
//!
//! Only loading and file-watching can fail. The tick itself never returns an
//! error: broken invariants inside a tick are assertions.

use std::path::PathBuf;

/// Error loading or validating simulation data (config, fighters, stages)
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid value: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ConfigError::Invalid(message.into())
    }
}

/// Error setting up the fighter data watcher
#[derive(Debug, thiserror::Error)]
pub enum HotReloadError {
    #[error("Watcher error: {0}")]
    Watch(#[from] notify::Error),
    #[error("Watched directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),
}

/// Read a JSON file and deserialize it, tagging IO errors with the path
pub fn read_json<T: serde::de::DeserializeOwned>(
    path: &std::path::Path,
) -> Result<T, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&text)?)
}

/// Replay that does not reproduce its recorded match
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("Replay has {expected} fighters, world has {actual}")]
    FighterCount { expected: usize, actual: usize },
    #[error("Replay was recorded on stage {expected}, world has {actual}")]
    StageMismatch { expected: String, actual: String },
    #[error("Replay fighter {index} is {expected}, world has {actual}")]
    FighterMismatch {
        index: usize,
        expected: String,
        actual: String,
    },
    #[error("World must start at tick 0, is at tick {0}")]
    NotFresh(u64),
    #[error("Diverged at tick {tick}: expected hash {expected:016x}, got {actual:016x}")]
    Diverged { tick: u64, expected: u64, actual: u64 },
    #[error(transparent)]
    Config(#[from] ConfigError),
}
