//! Pipeline configuration.

use std::time::Duration;

/// Default gap between one resolution finishing and the next starting.
pub const DEFAULT_PACING_MS: u64 = 800;

/// Default upper bound for a single provider attempt.
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 5;

/// Configuration parameters for address resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Minimum time between a resolution completing and the next one starting (ms).
    /// Keeps us inside the public geocoders' rate limits.
    pub pacing_ms: u64,

    /// Maximum time a single provider may take before the chain moves on (seconds).
    pub provider_timeout_secs: u64,
}

impl PipelineConfig {
    /// Set the pacing delay.
    pub fn with_pacing_ms(mut self, ms: u64) -> Self {
        self.pacing_ms = ms;
        self
    }

    /// Set the per-provider timeout.
    pub fn with_provider_timeout_secs(mut self, secs: u64) -> Self {
        self.provider_timeout_secs = secs;
        self
    }

    /// Returns the pacing delay as a Duration.
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    /// Returns the per-provider timeout as a Duration.
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            pacing_ms: DEFAULT_PACING_MS,
            provider_timeout_secs: DEFAULT_PROVIDER_TIMEOUT_SECS,
        }
    }
}
