//! Audit event entity for authentication and security events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Types of authentication events recorded in the audit log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthEventType {
    // Login events
    LoginSuccess,
    LoginFailed,
    Logout,
    LogoutAll,

    // OTP events
    OtpSent,
    OtpVerified,
    OtpFailed,
    OtpExpired,
    OtpRateLimited,

    // 2FA events
    TwoFactorEnabled,
    TwoFactorDisabled,
    TwoFactorChallenge,
    TwoFactorSuccess,
    TwoFactorFailed,
    RecoveryCodeUsed,

    // Password events
    PasswordChanged,

    // Token events
    TokenRefreshed,
    TokenRevoked,

    // Account events
    AccountLocked,
    AccountCreated,
    AccountDisabled,
}

impl AuthEventType {
    /// String representation stored by the audit collaborator
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LoginSuccess => "LOGIN_SUCCESS",
            Self::LoginFailed => "LOGIN_FAILED",
            Self::Logout => "LOGOUT",
            Self::LogoutAll => "LOGOUT_ALL",
            Self::OtpSent => "OTP_SENT",
            Self::OtpVerified => "OTP_VERIFIED",
            Self::OtpFailed => "OTP_FAILED",
            Self::OtpExpired => "OTP_EXPIRED",
            Self::OtpRateLimited => "OTP_RATE_LIMITED",
            Self::TwoFactorEnabled => "TWO_FACTOR_ENABLED",
            Self::TwoFactorDisabled => "TWO_FACTOR_DISABLED",
            Self::TwoFactorChallenge => "TWO_FACTOR_CHALLENGE",
            Self::TwoFactorSuccess => "TWO_FACTOR_SUCCESS",
            Self::TwoFactorFailed => "TWO_FACTOR_FAILED",
            Self::RecoveryCodeUsed => "RECOVERY_CODE_USED",
            Self::PasswordChanged => "PASSWORD_CHANGED",
            Self::TokenRefreshed => "TOKEN_REFRESHED",
            Self::TokenRevoked => "TOKEN_REVOKED",
            Self::AccountLocked => "ACCOUNT_LOCKED",
            Self::AccountCreated => "ACCOUNT_CREATED",
            Self::AccountDisabled => "ACCOUNT_DISABLED",
        }
    }
}

/// A single append-only audit record
///
/// Read back only by the lockout window queries; everything else is
/// write-only from this crate's perspective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthEvent {
    /// Unique identifier for the event
    pub id: Uuid,

    /// What happened
    pub event_type: AuthEventType,

    /// Principal involved, when known
    pub user_id: Option<Uuid>,

    /// Masked phone number; raw numbers are never recorded
    pub phone: Option<String>,

    /// Email involved, when known
    pub email: Option<String>,

    /// Client IP address
    pub ip_address: String,

    /// User agent string from the request
    pub user_agent: Option<String>,

    /// Whether the underlying action succeeded
    pub success: bool,

    /// Internal failure reason or extra context
    pub details: Option<String>,

    /// When the event occurred
    pub created_at: DateTime<Utc>,
}

impl AuthEvent {
    /// Creates a successful event
    pub fn new(event_type: AuthEventType, ip_address: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type,
            user_id: None,
            phone: None,
            email: None,
            ip_address: ip_address.into(),
            user_agent: None,
            success: true,
            details: None,
            created_at: Utc::now(),
        }
    }

    /// Creates a failed event with an internal reason
    pub fn failure(
        event_type: AuthEventType,
        ip_address: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        let mut event = Self::new(event_type, ip_address);
        event.success = false;
        event.details = Some(details.into());
        event
    }

    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Attaches an already-masked phone number
    pub fn with_phone(mut self, phone_masked: impl Into<String>) -> Self {
        self.phone = Some(phone_masked.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: Option<&str>) -> Self {
        self.user_agent = user_agent.map(String::from);
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}
