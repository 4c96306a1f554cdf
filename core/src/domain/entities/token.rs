//! Token entities for JWT-based authentication.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::otp::OtpContext;
use super::permission::Permission;
use super::user::{User, UserRole};

/// Kinds of signed tokens issued by the token service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenType {
    #[serde(rename = "access")]
    Access,
    #[serde(rename = "refresh")]
    Refresh,
    #[serde(rename = "temp")]
    Temp,
    #[serde(rename = "2fa_pending")]
    TwoFactorPending,
}

/// Claims structure for the JWT payload
///
/// A single shape covers all four token kinds; fields not used by a kind
/// are omitted from the encoded payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user ID, or `phone:<E.164>` for temp tokens
    pub sub: String,

    /// Token kind discriminator
    #[serde(rename = "type")]
    pub token_type: TokenType,

    /// Email address (access tokens)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Role name (access tokens)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,

    /// Granted permissions (access and temp tokens)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<Permission>>,

    /// Partner organisation (access tokens)
    #[serde(rename = "partnerId", skip_serializing_if = "Option::is_none")]
    pub partner_id: Option<String>,

    /// Token ID (refresh tokens; matches the stored record key)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,

    /// Device identifier (refresh tokens)
    #[serde(rename = "deviceId", skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,

    /// OTP context (temp tokens)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<OtpContext>,

    /// Reference to the donation or request being acted on (temp tokens)
    #[serde(rename = "referenceId", skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,

    /// Public tracking code (temp tokens)
    #[serde(rename = "trackingCode", skip_serializing_if = "Option::is_none")]
    pub tracking_code: Option<String>,

    /// Issuer
    pub iss: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,
}

impl Claims {
    fn base(sub: String, token_type: TokenType, issuer: &str, expires_in: i64) -> Self {
        let now = Utc::now();
        Self {
            sub,
            token_type,
            email: None,
            role: None,
            permissions: None,
            partner_id: None,
            jti: None,
            device_id: None,
            context: None,
            reference_id: None,
            tracking_code: None,
            iss: issuer.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(expires_in)).timestamp(),
        }
    }

    /// Claims for an access token
    pub fn access(user: &User, issuer: &str, expires_in: i64) -> Self {
        let mut claims = Self::base(user.id.to_string(), TokenType::Access, issuer, expires_in);
        claims.email = user.email.clone();
        claims.role = Some(user.role);
        claims.permissions = Some(Permission::for_role(user.role));
        claims.partner_id = user.partner_id.map(|id| id.to_string());
        claims
    }

    /// Claims for a refresh token keyed by `token_id`
    pub fn refresh(
        user_id: Uuid,
        token_id: &str,
        device_id: Option<&str>,
        issuer: &str,
        expires_in: i64,
    ) -> Self {
        let mut claims = Self::base(user_id.to_string(), TokenType::Refresh, issuer, expires_in);
        claims.jti = Some(token_id.to_string());
        claims.device_id = device_id.map(String::from);
        claims
    }

    /// Claims for a temporary token granting a scoped capability set to a
    /// phone-verified caller without a persistent account
    pub fn temp(
        phone: &str,
        context: OtpContext,
        reference_id: Uuid,
        tracking_code: &str,
        issuer: &str,
        expires_in: i64,
    ) -> Self {
        let mut claims = Self::base(format!("phone:{phone}"), TokenType::Temp, issuer, expires_in);
        claims.context = Some(context);
        claims.reference_id = Some(reference_id.to_string());
        claims.tracking_code = Some(tracking_code.to_string());
        claims.permissions = Some(context.granted_permissions());
        claims
    }

    /// Claims for a pending two-factor challenge; grants no permissions
    pub fn two_factor_pending(user_id: Uuid, issuer: &str, expires_in: i64) -> Self {
        Self::base(
            user_id.to_string(),
            TokenType::TwoFactorPending,
            issuer,
            expires_in,
        )
    }

    /// Parses the subject as a user ID
    pub fn user_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sub)
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Reason a refresh token record was revoked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RevokeReason {
    /// Replaced during normal rotation
    Rotation,
    /// Explicit single-session logout
    Logout,
    /// Explicit logout from all devices
    LogoutAll,
    /// Revoked en masse after a replay or theft signal
    Suspicious,
}

impl RevokeReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rotation => "ROTATION",
            Self::Logout => "LOGOUT",
            Self::LogoutAll => "LOGOUT_ALL",
            Self::Suspicious => "SUSPICIOUS",
        }
    }
}

/// Refresh token record persisted in the durable store
///
/// Keyed by the token's `jti`; only a hash of the token string is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenRecord {
    /// Token ID, equal to the JWT `jti` claim
    pub id: String,

    /// User this token belongs to
    pub user_id: Uuid,

    /// SHA-256 hash of the token string
    pub token_hash: String,

    /// Device identifier for multi-device management
    pub device_id: Option<String>,

    /// User agent string captured at issuance
    pub device_info: Option<String>,

    /// IP address the token was issued to
    pub ip_address: Option<String>,

    /// When the token was last used for rotation
    pub last_used_at: Option<DateTime<Utc>>,

    /// When the token expires
    pub expires_at: DateTime<Utc>,

    /// When the token was revoked; set at most once
    pub revoked_at: Option<DateTime<Utc>>,

    /// Why the token was revoked
    pub revoke_reason: Option<RevokeReason>,

    pub created_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    pub fn new(
        id: impl Into<String>,
        user_id: Uuid,
        token_hash: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            user_id,
            token_hash: token_hash.into(),
            device_id: None,
            device_info: None,
            ip_address: None,
            last_used_at: None,
            expires_at,
            revoked_at: None,
            revoke_reason: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_device(mut self, device_id: Option<String>, device_info: Option<String>) -> Self {
        self.device_id = device_id;
        self.device_info = device_info;
        self
    }

    pub fn with_ip(mut self, ip_address: impl Into<String>) -> Self {
        self.ip_address = Some(ip_address.into());
        self
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Valid means unrevoked and unexpired
    pub fn is_valid(&self) -> bool {
        self.revoked_at.is_none() && !self.is_expired()
    }

    /// Revokes the record; revocation is monotonic, so a second call with
    /// a different reason leaves the first intact
    pub fn revoke(&mut self, reason: RevokeReason) {
        if self.revoked_at.is_none() {
            self.revoked_at = Some(Utc::now());
            self.revoke_reason = Some(reason);
        }
    }

    /// Records that the token was presented for rotation
    pub fn record_usage(&mut self) {
        self.last_used_at = Some(Utc::now());
    }
}

/// Access/refresh pair returned to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    #[serde(rename = "accessToken")]
    pub access_token: String,

    #[serde(rename = "refreshToken")]
    pub refresh_token: String,

    /// Seconds until the access token expires
    #[serde(rename = "expiresIn")]
    pub expires_in: i64,

    #[serde(rename = "tokenType")]
    pub token_type: String,
}

impl TokenPair {
    pub fn new(access_token: String, refresh_token: String, expires_in: i64) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_in,
            token_type: String::from("Bearer"),
        }
    }
}
