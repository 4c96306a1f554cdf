//! Domain-specific error types and error handling.
//!
//! Each concern carries its own error enum; `DomainError` bridges them
//! into a single result type. Variants carry the structured fields the
//! caller needs to react (retry-after hints, remaining attempts) instead
//! of encoding them in messages.

use shifa_shared::types::ErrorResponse;
use thiserror::Error;

/// Authentication and login failures
///
/// `InvalidCredentials` deliberately covers both unknown email and wrong
/// password so callers cannot enumerate accounts. Audit records keep the
/// distinction internally.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account is disabled")]
    AccountDisabled,

    #[error("Too many failed attempts")]
    RateLimited { retry_after_seconds: i64 },

    #[error("User not found")]
    UserNotFound,
}

/// Token verification and minting failures
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Token has expired")]
    Expired,

    #[error("Invalid token")]
    Invalid,

    #[error("Token generation failed")]
    GenerationFailed,
}

/// Two-factor authentication failures
#[derive(Error, Debug)]
pub enum TwoFactorError {
    #[error("Two-factor authentication is already enabled")]
    AlreadyEnabled,

    #[error("Two-factor setup has not been initiated")]
    NotInitiated,

    #[error("Two-factor authentication is not enabled")]
    NotEnabled,

    #[error("Invalid verification code")]
    InvalidCode,

    #[error("Too many failed verification attempts")]
    TooManyAttempts,
}

/// OTP issuance and verification failures
#[derive(Error, Debug)]
pub enum OtpError {
    #[error("OTP has expired")]
    Expired,

    #[error("Invalid OTP code")]
    InvalidCode { remaining_attempts: i64 },

    #[error("Maximum verification attempts exceeded")]
    TooManyAttempts,

    #[error("Too many OTP requests")]
    RateLimited { retry_after_seconds: i64 },

    #[error("Failed to deliver OTP")]
    DeliveryFailed,
}

/// Core domain errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    TwoFactor(#[from] TwoFactorError),

    #[error(transparent)]
    Otp(#[from] OtpError),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Stable error code for API responses and audit details
    pub fn code(&self) -> &'static str {
        match self {
            Self::Internal { .. } => "INTERNAL_ERROR",
            Self::Auth(e) => match e {
                AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
                AuthError::AccountDisabled => "ACCOUNT_DISABLED",
                AuthError::RateLimited { .. } => "RATE_LIMITED",
                AuthError::UserNotFound => "USER_NOT_FOUND",
            },
            Self::Token(e) => match e {
                TokenError::Expired => "TOKEN_EXPIRED",
                TokenError::Invalid => "INVALID_TOKEN",
                TokenError::GenerationFailed => "TOKEN_GENERATION_FAILED",
            },
            Self::TwoFactor(e) => match e {
                TwoFactorError::AlreadyEnabled => "2FA_ALREADY_ENABLED",
                TwoFactorError::NotInitiated => "2FA_NOT_INITIATED",
                TwoFactorError::NotEnabled => "2FA_NOT_ENABLED",
                TwoFactorError::InvalidCode => "INVALID_CODE",
                TwoFactorError::TooManyAttempts => "2FA_TOO_MANY_ATTEMPTS",
            },
            Self::Otp(e) => match e {
                OtpError::Expired => "OTP_EXPIRED",
                OtpError::InvalidCode { .. } => "INVALID_OTP",
                OtpError::TooManyAttempts => "TOO_MANY_ATTEMPTS",
                OtpError::RateLimited { .. } => "RATE_LIMITED",
                OtpError::DeliveryFailed => "OTP_DELIVERY_FAILED",
            },
        }
    }
}

impl From<&DomainError> for ErrorResponse {
    fn from(err: &DomainError) -> Self {
        let response = ErrorResponse::new(err.code(), err.to_string());
        match err {
            DomainError::Auth(AuthError::RateLimited {
                retry_after_seconds,
            })
            | DomainError::Otp(OtpError::RateLimited {
                retry_after_seconds,
            }) => response.with_detail("retry_after", serde_json::json!(retry_after_seconds)),
            DomainError::Otp(OtpError::InvalidCode { remaining_attempts }) => {
                response.with_detail("remaining_attempts", serde_json::json!(remaining_attempts))
            }
            _ => response,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(
            DomainError::from(AuthError::InvalidCredentials).code(),
            "INVALID_CREDENTIALS"
        );
        assert_eq!(DomainError::from(TokenError::Expired).code(), "TOKEN_EXPIRED");
        assert_eq!(
            DomainError::from(OtpError::TooManyAttempts).code(),
            "TOO_MANY_ATTEMPTS"
        );
    }

    #[test]
    fn test_rate_limit_response_carries_retry_after() {
        let err = DomainError::from(OtpError::RateLimited {
            retry_after_seconds: 1800,
        });
        let response = ErrorResponse::from(&err);
        assert_eq!(response.error, "RATE_LIMITED");
        assert_eq!(response.details.unwrap()["retry_after"], 1800);
    }

    #[test]
    fn test_invalid_otp_response_carries_remaining_attempts() {
        let err = DomainError::from(OtpError::InvalidCode {
            remaining_attempts: 1,
        });
        let response = ErrorResponse::from(&err);
        assert_eq!(response.details.unwrap()["remaining_attempts"], 1);
    }

    #[test]
    fn test_credential_failures_are_indistinguishable() {
        // Unknown email and wrong password must produce identical
        // caller-visible output.
        let a = DomainError::from(AuthError::InvalidCredentials).to_string();
        assert_eq!(a, "Invalid email or password");
    }
}
