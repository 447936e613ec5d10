//! Structured logging for the simulation.
//!
//! The core only emits `tracing` events; binaries and the Bevy plugin decide
//! where they go. Levels used across the crate:
//! - `trace`: state transitions (one per fighter per change)
//! - `debug`: action switches, fighter creation
//! - `info`: blast-zone resets, reloads, match summaries
//! - `warn`: degraded assets (Null clips, fallback actions)

use serde::{Deserialize, Serialize};
use std::sync::Once;
use tracing_subscriber::EnvFilter;

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Subscriber settings, usually embedded in [`crate::config::SimConfig`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracingConfig {
    pub default_level: LogLevel,
    pub module_filters: Vec<(String, LogLevel)>,
    pub show_thread_ids: bool,
    pub show_targets: bool,
    pub show_file_line: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            default_level: LogLevel::Info,
            module_filters: vec![
                ("fighter_core::fighter".to_string(), LogLevel::Info),
                ("fighter_core::action".to_string(), LogLevel::Info),
                ("fighter_core::world".to_string(), LogLevel::Info),
                ("fighter_core::hotreload".to_string(), LogLevel::Debug),
            ],
            show_thread_ids: false,
            show_targets: true,
            show_file_line: false,
        }
    }
}

impl TracingConfig {
    pub fn to_env_filter_string(&self) -> String {
        let mut parts = vec![self.default_level.as_str().to_string()];
        for (module, level) in &self.module_filters {
            parts.push(format!("{}={}", module, level.as_str()));
        }
        parts.join(",")
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        EnvFilter::try_new(self.to_env_filter_string())
            .map(|_| ())
            .map_err(|e| ConfigError::invalid(format!("bad log filter: {e}")))
    }
}

static TRACING_INIT: Once = Once::new();

pub fn init_tracing_default() {
    init_tracing(&TracingConfig::default());
}

/// Install the global subscriber. First call wins; `RUST_LOG` overrides the config.
pub fn init_tracing(config: &TracingConfig) {
    let filter_str = config.to_env_filter_string();
    let config = config.clone();
    TRACING_INIT.call_once(move || {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(config.show_targets)
            .with_thread_ids(config.show_thread_ids)
            .with_file(config.show_file_line)
            .with_line_number(config.show_file_line)
            .compact();

        // Bevy's LogPlugin may already own the global subscriber
        let _ = subscriber.try_init();
    });
}

/// Span guard around a timed operation; exits the span on drop
pub struct TimingSpan {
    _span: tracing::span::EnteredSpan,
}

impl TimingSpan {
    pub fn new(name: &str) -> Self {
        let span = tracing::debug_span!("operation", name = name);
        Self {
            _span: span.entered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_filter_string() {
        let config = TracingConfig::default();
        let filter = config.to_env_filter_string();
        assert!(filter.starts_with("info"));
        assert!(filter.contains("fighter_core::hotreload=debug"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_custom_config() {
        let config = TracingConfig {
            default_level: LogLevel::Debug,
            module_filters: vec![("fighter_core::fighter".to_string(), LogLevel::Trace)],
            ..Default::default()
        };
        let filter = config.to_env_filter_string();
        assert_eq!(filter, "debug,fighter_core::fighter=trace");
    }

    #[test]
    fn test_tracing_config_json_roundtrip() {
        let config = TracingConfig::default();
        let json = config.to_json().unwrap();
        assert!(json.contains("\"info\""));
        let restored = TracingConfig::from_json(&json).unwrap();
        assert_eq!(restored, config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = TracingConfig::from_json(r#"{"default_level": "warn"}"#).unwrap();
        assert_eq!(config.default_level, LogLevel::Warn);
        assert!(config.show_targets);
    }

    #[test]
    fn test_bad_filter_rejected() {
        let config = TracingConfig {
            module_filters: vec![("fighter_core[span".to_string(), LogLevel::Info)],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_init_tracing_idempotent() {
        init_tracing_default();
        init_tracing_default();
        init_tracing(&TracingConfig::default());
    }

    #[test]
    fn test_timing_span() {
        init_tracing_default();
        let _span = TimingSpan::new("test_operation");
        tracing::debug!("inside span");
    }
}
