//! Login lockout configuration

use serde::{Deserialize, Serialize};

/// Brute-force lockout policy for password logins
///
/// Failure counts are evaluated over a trailing window of audit history.
/// The IP threshold is a multiple of the per-account threshold so shared
/// NAT addresses are not over-penalized.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LockoutConfig {
    /// Failed logins per email before lockout
    pub max_failed_logins: usize,

    /// Trailing window for counting failures, in minutes
    pub window_minutes: i64,

    /// IP threshold as a multiple of `max_failed_logins`
    pub ip_threshold_multiplier: usize,

    /// Minutes a credential stays locked once the failure counter trips
    pub credential_lock_minutes: i64,
}

impl LockoutConfig {
    /// Failed logins per IP before lockout
    pub fn max_failed_by_ip(&self) -> usize {
        self.max_failed_logins * self.ip_threshold_multiplier
    }

    /// Window length in seconds
    pub fn window_seconds(&self) -> i64 {
        self.window_minutes * 60
    }
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            max_failed_logins: 5,
            window_minutes: 15,
            ip_threshold_multiplier: 2,
            credential_lock_minutes: 15,
        }
    }
}
