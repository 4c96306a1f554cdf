//! OTP issuance configuration

use serde::{Deserialize, Serialize};

/// One-time code configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OtpConfig {
    /// Number of digits in a generated code
    pub length: u32,

    /// Seconds before a stored code expires
    pub expiry_seconds: i64,

    /// Maximum verification attempts per code
    pub max_attempts: i64,

    /// Maximum codes sent per phone per hour (fixed window)
    pub rate_limit_per_hour: i64,

    /// Delivery attempts before giving up on the gateway
    pub delivery_max_attempts: u32,

    /// Base delay between delivery retries in milliseconds (doubles per retry)
    pub delivery_base_delay_ms: u64,

    /// bcrypt cost for stored code hashes
    pub hash_cost: u32,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            length: 6,
            expiry_seconds: 300, // 5 minutes
            max_attempts: 3,
            rate_limit_per_hour: 3,
            delivery_max_attempts: 3,
            delivery_base_delay_ms: 200,
            hash_cost: 12,
        }
    }
}
