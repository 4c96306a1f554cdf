//! Two-factor authentication configuration

use serde::{Deserialize, Serialize};

/// TOTP two-factor configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TwoFactorConfig {
    /// Issuer label shown in authenticator apps
    pub issuer: String,

    /// Key used to encrypt TOTP secrets at rest
    pub secret_encryption_key: String,

    /// Number of single-use recovery codes issued per setup
    pub recovery_code_count: usize,

    /// Maximum failed challenge attempts per pending login
    pub max_login_attempts: i64,

    /// bcrypt cost for recovery code hashes
    pub hash_cost: u32,
}

impl Default for TwoFactorConfig {
    fn default() -> Self {
        Self {
            issuer: String::from("Shifa"),
            secret_encryption_key: String::from("change-me-2fa-at-rest-key"),
            recovery_code_count: 10,
            max_login_attempts: 5,
            hash_cost: 12,
        }
    }
}
