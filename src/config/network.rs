//! Backend connection settings: HTTP client and live feed

use serde::Deserialize;
use std::time::Duration;

use crate::feed::FeedConfig;

// ─────────────────────────────────────────────────────────────────────────────
// HTTP
// ─────────────────────────────────────────────────────────────────────────────

/// REST client settings
#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// Per-request timeout
    pub timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileHttp {
    pub timeout_secs: Option<u64>,
}

impl HttpSettings {
    pub fn from_file(file: Option<FileHttp>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            timeout_secs: file.timeout_secs.unwrap_or(defaults.timeout_secs),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Live feed
// ─────────────────────────────────────────────────────────────────────────────

/// Live feed log size and reconnect policy
#[derive(Debug, Clone)]
pub struct FeedSettings {
    /// Entries kept and persisted
    pub capacity: usize,
    /// First reconnect delay; doubles per failed attempt
    pub reconnect_base_ms: u64,
    /// Upper bound for the reconnect delay
    pub reconnect_max_ms: u64,
    /// Give up after this many consecutive failures (0 = never)
    pub max_attempts: u32,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            capacity: crate::feed::DEFAULT_CAPACITY,
            reconnect_base_ms: 1_000,
            reconnect_max_ms: 30_000,
            max_attempts: 0,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileFeed {
    pub capacity: Option<usize>,
    pub reconnect_base_ms: Option<u64>,
    pub reconnect_max_ms: Option<u64>,
    pub max_attempts: Option<u32>,
}

impl FeedSettings {
    pub fn from_file(file: Option<FileFeed>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            capacity: file.capacity.unwrap_or(defaults.capacity).max(1),
            reconnect_base_ms: file.reconnect_base_ms.unwrap_or(defaults.reconnect_base_ms),
            reconnect_max_ms: file.reconnect_max_ms.unwrap_or(defaults.reconnect_max_ms),
            max_attempts: file.max_attempts.unwrap_or(defaults.max_attempts),
        }
    }

    /// Runtime form consumed by the subscriber
    pub fn to_feed_config(&self) -> FeedConfig {
        FeedConfig {
            capacity: self.capacity,
            reconnect_base: Duration::from_millis(self.reconnect_base_ms),
            reconnect_max: Duration::from_millis(self.reconnect_max_ms.max(self.reconnect_base_ms)),
            max_attempts: (self.max_attempts > 0).then_some(self.max_attempts),
        }
    }
}
