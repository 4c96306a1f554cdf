//! Main token service implementation

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use uuid::Uuid;

use shifa_shared::config::JwtConfig;

use crate::domain::entities::otp::OtpContext;
use crate::domain::entities::token::Claims;
use crate::domain::entities::user::User;
use crate::errors::DomainResult;

use super::signer::TokenSigner;

/// Service minting and verifying the platform's signed tokens
pub struct TokenService {
    signer: TokenSigner,
    config: JwtConfig,
}

impl TokenService {
    /// Creates a new token service from JWT configuration
    pub fn new(config: JwtConfig) -> Self {
        let signer = TokenSigner::hs256(&config.secret, &config.issuer);
        Self { signer, config }
    }

    /// Mints an access token for an authenticated principal
    ///
    /// Claims carry the email, role, and the permission set derived from
    /// the role.
    pub fn mint_access(&self, user: &User) -> DomainResult<String> {
        let claims = Claims::access(user, &self.config.issuer, self.config.access_token_expiry);
        self.signer.sign(&claims)
    }

    /// Mints a refresh token keyed by `token_id` (the `jti` claim)
    pub fn mint_refresh(
        &self,
        user_id: Uuid,
        token_id: &str,
        device_id: Option<&str>,
    ) -> DomainResult<String> {
        let claims = Claims::refresh(
            user_id,
            token_id,
            device_id,
            &self.config.issuer,
            self.config.refresh_token_expiry,
        );
        self.signer.sign(&claims)
    }

    /// Mints a temporary token granting a scoped capability set to an
    /// OTP-verified phone without creating a principal
    pub fn mint_temp(
        &self,
        phone: &str,
        context: OtpContext,
        reference_id: Uuid,
        tracking_code: &str,
    ) -> DomainResult<String> {
        let claims = Claims::temp(
            phone,
            context,
            reference_id,
            tracking_code,
            &self.config.issuer,
            self.config.temp_token_expiry,
        );
        self.signer.sign(&claims)
    }

    /// Mints a pending two-factor challenge token; grants no permissions
    pub fn mint_two_factor_pending(&self, user_id: Uuid) -> DomainResult<String> {
        let claims = Claims::two_factor_pending(
            user_id,
            &self.config.issuer,
            self.config.pending_token_expiry,
        );
        self.signer.sign(&claims)
    }

    /// Verifies a token's signature, expiry, and issuer, returning its
    /// claims
    pub fn verify(&self, token: &str) -> DomainResult<Claims> {
        self.signer.verify(token)
    }

    /// Extracts the subject without verifying the signature
    ///
    /// For logging and diagnostics only. Never use this for
    /// authorization.
    pub fn unsafe_extract_subject(&self, token: &str) -> Option<String> {
        let payload = token.split('.').nth(1)?;
        let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
        let value: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
        value.get("sub")?.as_str().map(String::from)
    }

    /// Seconds an access token stays valid
    pub fn access_token_expiry(&self) -> i64 {
        self.config.access_token_expiry
    }

    /// Seconds a refresh token stays valid
    pub fn refresh_token_expiry(&self) -> i64 {
        self.config.refresh_token_expiry
    }

    /// Seconds a temp token stays valid
    pub fn temp_token_expiry(&self) -> i64 {
        self.config.temp_token_expiry
    }
}
