//! Application Configuration
//!
//! Simulated latencies for the portal views.

use platform::config::env_duration_ms;
use std::time::Duration;

/// Portal application configuration
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Time the simulated image upload and classification takes
    pub classification_latency: Duration,
    /// Time the simulated report submission takes
    pub submission_latency: Duration,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self::development()
    }
}

impl PortalConfig {
    /// Demo latencies: 2 s upload, 1.5 s submit
    pub fn development() -> Self {
        Self {
            classification_latency: Duration::from_millis(2000),
            submission_latency: Duration::from_millis(1500),
        }
    }

    /// No simulated delays
    pub fn instant() -> Self {
        Self {
            classification_latency: Duration::ZERO,
            submission_latency: Duration::ZERO,
        }
    }

    /// Apply `PORTAL_*` environment overrides
    pub fn with_env_overrides(mut self) -> Self {
        self.classification_latency =
            env_duration_ms("PORTAL_CLASSIFY_LATENCY_MS", self.classification_latency);
        self.submission_latency =
            env_duration_ms("PORTAL_SUBMIT_LATENCY_MS", self.submission_latency);
        self
    }
}
