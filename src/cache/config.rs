//! Settings for the catalog cache and its consumer cadence.

use std::time::Duration;

use serde::Deserialize;

/// Cache knobs read from the `[cache]` section of `carta.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Master switch. When off, reads go straight to the repository and
    /// writes publish no events.
    pub enabled: bool,
    /// How long a cached entry stays valid, in seconds.
    pub ttl_seconds: u64,
    /// Pause between background consumption passes, in milliseconds.
    pub auto_consume_interval_ms: u64,
    /// Upper bound on events drained per consumption pass.
    pub consume_batch_limit: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: 3600,
            auto_consume_interval_ms: 5_000,
            consume_batch_limit: 100,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(value: &crate::config::CacheSettings) -> Self {
        Self {
            enabled: value.enabled,
            ttl_seconds: value.ttl_seconds,
            auto_consume_interval_ms: value.auto_consume_interval_ms,
            consume_batch_limit: value.consume_batch_limit,
        }
    }
}

impl CacheConfig {
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Entry time-to-live, clamped to one second at minimum.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds.max(1))
    }
}
