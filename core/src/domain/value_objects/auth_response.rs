//! Authentication response value objects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::user::{User, UserRole};

/// User information included in a login response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub role: UserRole,
    #[serde(rename = "partnerId", skip_serializing_if = "Option::is_none")]
    pub partner_id: Option<String>,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            partner_id: user.partner_id.map(|id| id.to_string()),
        }
    }
}

/// Response after a login attempt
///
/// Two modes: a full token grant, or a two-factor challenge carrying a
/// short-lived pending token and no access credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    // Success response (no 2FA, or 2FA completed)
    #[serde(rename = "accessToken", skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(rename = "refreshToken", skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(rename = "expiresIn", skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    #[serde(rename = "tokenType", skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserInfo>,

    // 2FA challenge response
    #[serde(rename = "requires2FA", skip_serializing_if = "Option::is_none")]
    pub requires_two_factor: Option<bool>,
    #[serde(rename = "tempToken", skip_serializing_if = "Option::is_none")]
    pub temp_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<String>>,
}

impl AuthResponse {
    /// Full token grant
    pub fn success(
        access_token: String,
        refresh_token: String,
        expires_in: i64,
        user: UserInfo,
    ) -> Self {
        Self {
            access_token: Some(access_token),
            refresh_token: Some(refresh_token),
            expires_in: Some(expires_in),
            token_type: Some(String::from("Bearer")),
            user: Some(user),
            requires_two_factor: None,
            temp_token: None,
            methods: None,
        }
    }

    /// Two-factor challenge; no access or refresh token issued yet
    pub fn challenge(temp_token: String) -> Self {
        Self {
            access_token: None,
            refresh_token: None,
            expires_in: None,
            token_type: None,
            user: None,
            requires_two_factor: Some(true),
            temp_token: Some(temp_token),
            methods: Some(vec![String::from("TOTP")]),
        }
    }

    pub fn is_challenge(&self) -> bool {
        self.requires_two_factor == Some(true)
    }
}

/// Result of initiating a two-factor setup
///
/// The plaintext recovery codes appear here exactly once and are never
/// retrievable again; only their hashes are persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwoFactorSetup {
    /// Base32-encoded TOTP secret
    pub secret: String,

    /// QR code as a base64 PNG data URI for authenticator apps
    #[serde(rename = "qrCodeImage")]
    pub qr_code_image: String,

    /// Single-use recovery codes, plaintext
    #[serde(rename = "recoveryCodes")]
    pub recovery_codes: Vec<String>,
}

/// Current two-factor state for a principal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwoFactorStatus {
    pub enabled: bool,
    #[serde(rename = "enabledAt", skip_serializing_if = "Option::is_none")]
    pub enabled_at: Option<DateTime<Utc>>,
    #[serde(rename = "recoveryCodesRemaining")]
    pub recovery_codes_remaining: usize,
}
