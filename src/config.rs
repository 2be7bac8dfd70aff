//! Engine configuration: worker counts, probe limits, retry policy.

use serde::Deserialize;
use std::time::Duration;

/// Retry policy injected into every network-probing check.
#[derive(Debug, Clone, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts per resource (first try included)
    pub max_attempts: u32,
    /// Timeout applied to each individual attempt, in seconds
    pub per_attempt_timeout_secs: u64,
    /// Flat backoff between attempts, in milliseconds
    pub backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            per_attempt_timeout_secs: 5,
            backoff_ms: 250,
        }
    }
}

impl RetryPolicy {
    pub fn per_attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.per_attempt_timeout_secs)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

/// Limits for the page-depth prober. Both caps are hard: traversal stops
/// as soon as either is hit, which is what guarantees termination.
#[derive(Debug, Clone, Deserialize)]
pub struct ProberConfig {
    pub max_depth: usize,
    pub max_total_urls: usize,
    pub concurrency: usize,
    pub delay_between_requests_ms: u64,
}

impl Default for ProberConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            max_total_urls: 100,
            concurrency: 5,
            delay_between_requests_ms: 100,
        }
    }
}

/// Top-level engine settings.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Worker pool size for blocking checks
    pub sync_workers: usize,
    /// Maximum concurrent in-flight requests inside a single fan-out check
    pub max_in_flight_probes: usize,
    /// Overall deadline for one full analysis, in seconds
    pub deadline_secs: u64,
    pub retry: RetryPolicy,
    pub prober: ProberConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sync_workers: 8,
            max_in_flight_probes: 10,
            deadline_secs: 120,
            retry: RetryPolicy::default(),
            prober: ProberConfig::default(),
        }
    }
}
