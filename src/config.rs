//! Engine configuration: save slot, versioning, and timing limits.
//!
//! Every field has a default matching the shipped game, so hosts can pass an
//! empty document (`{}`) or override only what they need.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Host-tunable engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Storage key of the single save slot.
    pub save_key: String,
    /// Version string written into every save.
    pub game_version: String,
    /// Minimum frame-clock gap between autosaves.
    pub autosave_interval_ms: u64,
    /// Upper clamp on a single frame's delta, in seconds.
    pub max_frame_delta_secs: f64,
    /// Offline progress is credited for at most this long.
    pub max_offline_ms: u64,
    /// Gaps shorter than this earn no offline progress.
    pub min_offline_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            save_key: "egg-empire-save".to_string(),
            game_version: "1.0.0".to_string(),
            autosave_interval_ms: 30_000,
            max_frame_delta_secs: 1.0,
            max_offline_ms: 86_400_000,
            min_offline_ms: 1_000,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON config document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] if the string is not valid JSON for this
    /// shape, or [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.save_key.is_empty() {
            return Err(ConfigError::Invalid("save_key must not be empty".into()));
        }
        if !self.max_frame_delta_secs.is_finite() || self.max_frame_delta_secs <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "max_frame_delta_secs must be positive, got {}",
                self.max_frame_delta_secs
            )));
        }
        if self.min_offline_ms > self.max_offline_ms {
            return Err(ConfigError::Invalid(format!(
                "min_offline_ms ({}) exceeds max_offline_ms ({})",
                self.min_offline_ms, self.max_offline_ms
            )));
        }
        Ok(())
    }
}
