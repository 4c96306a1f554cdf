//! JWT signing configuration

use serde::{Deserialize, Serialize};

/// JWT token configuration
///
/// Symmetric (HS256) signing in this phase. The signer seam in the core
/// crate allows swapping to asymmetric keys without changing claim shapes.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Secret key for HS256 signing (must be at least 32 bytes)
    pub secret: String,

    /// Token issuer claim
    pub issuer: String,

    /// Access token expiry in seconds
    pub access_token_expiry: i64,

    /// Refresh token expiry in seconds
    pub refresh_token_expiry: i64,

    /// Temporary (OTP-scoped) token expiry in seconds
    pub temp_token_expiry: i64,

    /// Pending two-factor challenge token expiry in seconds
    pub pending_token_expiry: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::from("change-me-in-production-0123456789abcdef"),
            issuer: String::from("shifa.org"),
            access_token_expiry: 3600,     // 1 hour
            refresh_token_expiry: 604_800, // 7 days
            temp_token_expiry: 900,        // 15 minutes
            pending_token_expiry: 300,     // 5 minutes
        }
    }
}

impl JwtConfig {
    /// Create a new JWT configuration with the given secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Check if the default placeholder secret is still in use
    pub fn is_using_default_secret(&self) -> bool {
        self.secret == JwtConfig::default().secret
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_expiry_values() {
        let config = JwtConfig::default();
        assert_eq!(config.access_token_expiry, 3600);
        assert_eq!(config.refresh_token_expiry, 604_800);
        assert_eq!(config.temp_token_expiry, 900);
        assert_eq!(config.pending_token_expiry, 300);
        assert!(config.is_using_default_secret());
    }

    #[test]
    fn test_custom_secret_is_not_default() {
        let config = JwtConfig::new("a-real-secret-that-is-long-enough-123456");
        assert!(!config.is_using_default_secret());
        assert_eq!(config.issuer, "shifa.org");
    }
}
