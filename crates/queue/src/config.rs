//! Scheduler configuration.
//!
//! Parsed from TOML with per-field defaults, then overridden from the
//! environment. Convention: `MARQUEE_KEY` overrides `key`.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::QueueError;
use crate::item::{saturating_millis, MIN_DURATION};

/// Runtime knobs for the [`Scheduler`](crate::Scheduler).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Budget for the combined on-screen time of low-priority items.
    #[serde(default = "default_max_timeout_ms")]
    pub max_timeout_ms: u64,

    /// Items with a priority at or below this value count against the budget.
    #[serde(default = "default_low_priority_threshold")]
    pub low_priority_threshold: i64,

    /// Drop an enqueue whose text is already pending.
    #[serde(default = "default_skip_duplicates")]
    pub skip_duplicate_messages: bool,
}

fn default_max_timeout_ms() -> u64 {
    10_000
}

fn default_low_priority_threshold() -> i64 {
    99
}

fn default_skip_duplicates() -> bool {
    true
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_timeout_ms: default_max_timeout_ms(),
            low_priority_threshold: default_low_priority_threshold(),
            skip_duplicate_messages: default_skip_duplicates(),
        }
    }
}

impl SchedulerConfig {
    /// Parse config from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, QueueError> {
        let mut config: Self = toml::from_str(toml_str)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load config from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, QueueError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    /// The budget as a [`Duration`].
    pub fn max_timeout(&self) -> Duration {
        Duration::from_millis(self.max_timeout_ms)
    }

    /// Reject values the scheduler would refuse at runtime.
    pub fn validate(&self) -> Result<(), QueueError> {
        let min_ms = saturating_millis(MIN_DURATION);
        if self.max_timeout_ms < min_ms {
            return Err(QueueError::MaxTimeoutTooSmall {
                requested_ms: self.max_timeout_ms,
                min_ms,
            });
        }
        Ok(())
    }

    /// Apply environment variable overrides.
    ///
    /// - `MARQUEE_MAX_TIMEOUT_MS` -> `max_timeout_ms`
    /// - `MARQUEE_LOW_PRIORITY_THRESHOLD` -> `low_priority_threshold`
    /// - `MARQUEE_SKIP_DUPLICATES` -> `skip_duplicate_messages`
    ///
    /// Unparseable values are ignored with a warning.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("MARQUEE_MAX_TIMEOUT_MS") {
            match v.parse::<u64>() {
                Ok(ms) => self.max_timeout_ms = ms,
                Err(_) => tracing::warn!(value = %v, "ignoring invalid MARQUEE_MAX_TIMEOUT_MS"),
            }
        }
        if let Ok(v) = std::env::var("MARQUEE_LOW_PRIORITY_THRESHOLD") {
            match v.parse::<i64>() {
                Ok(threshold) => self.low_priority_threshold = threshold,
                Err(_) => tracing::warn!(
                    value = %v,
                    "ignoring invalid MARQUEE_LOW_PRIORITY_THRESHOLD"
                ),
            }
        }
        if let Ok(v) = std::env::var("MARQUEE_SKIP_DUPLICATES") {
            match v.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.skip_duplicate_messages = true,
                "0" | "false" | "no" | "off" => self.skip_duplicate_messages = false,
                _ => tracing::warn!(value = %v, "ignoring invalid MARQUEE_SKIP_DUPLICATES"),
            }
        }
    }
}
