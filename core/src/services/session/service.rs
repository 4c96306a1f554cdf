//! Main session service implementation

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{Duration, Utc};
use constant_time_eq::constant_time_eq;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::audit::{AuthEvent, AuthEventType};
use crate::domain::entities::token::{RefreshTokenRecord, RevokeReason, TokenPair, TokenType};
use crate::domain::entities::user::User;
use crate::domain::value_objects::{AuthResponse, UserInfo};
use crate::errors::{AuthError, DomainError, DomainResult, TokenError};
use crate::repositories::{AuditLogRepository, TokenRepository, UserRepository};
use crate::services::audit::AuditService;
use crate::services::token::TokenService;

/// Session and refresh-token engine
pub struct SessionService<T, U, A>
where
    T: TokenRepository,
    U: UserRepository,
    A: AuditLogRepository + 'static,
{
    token_repository: Arc<T>,
    user_repository: Arc<U>,
    tokens: Arc<TokenService>,
    audit: Arc<AuditService<A>>,
}

impl<T, U, A> SessionService<T, U, A>
where
    T: TokenRepository,
    U: UserRepository,
    A: AuditLogRepository + 'static,
{
    pub fn new(
        token_repository: Arc<T>,
        user_repository: Arc<U>,
        tokens: Arc<TokenService>,
        audit: Arc<AuditService<A>>,
    ) -> Self {
        Self {
            token_repository,
            user_repository,
            tokens,
            audit,
        }
    }

    /// Issues a full session for an authenticated principal
    ///
    /// Mints an access/refresh pair, persists the refresh record (hash
    /// only, never the raw token), updates the user's last login, and
    /// audits `LOGIN_SUCCESS`.
    pub async fn issue_session(
        &self,
        user: &User,
        device_id: Option<&str>,
        ip_address: &str,
        user_agent: Option<&str>,
    ) -> DomainResult<AuthResponse> {
        let token_id = Uuid::new_v4().to_string();
        let access_token = self.tokens.mint_access(user)?;
        let refresh_token = self.tokens.mint_refresh(user.id, &token_id, device_id)?;

        let record = RefreshTokenRecord::new(
            token_id,
            user.id,
            hash_token(&refresh_token),
            Utc::now() + Duration::seconds(self.tokens.refresh_token_expiry()),
        )
        .with_device(device_id.map(String::from), user_agent.map(String::from))
        .with_ip(ip_address);
        self.token_repository.save(record).await?;

        let mut updated = user.clone();
        updated.record_login();
        self.user_repository.update(updated).await?;

        let mut event = AuthEvent::new(AuthEventType::LoginSuccess, ip_address)
            .with_user(user.id)
            .with_user_agent(user_agent);
        if let Some(email) = &user.email {
            event = event.with_email(email.clone());
        }
        self.audit.record(event).await;

        Ok(AuthResponse::success(
            access_token,
            refresh_token,
            self.tokens.access_token_expiry(),
            UserInfo::from(user),
        ))
    }

    /// Rotates a refresh token: one token in, one token out
    ///
    /// Presenting a revoked or expired record is treated as replay of a
    /// dead token, a strong theft signal, and revokes every live refresh
    /// token for the principal before failing.
    pub async fn rotate(&self, refresh_token: &str, ip_address: &str) -> DomainResult<TokenPair> {
        let claims = self.tokens.verify(refresh_token)?;
        if claims.token_type != TokenType::Refresh {
            return Err(DomainError::Token(TokenError::Invalid));
        }
        let user_id = claims
            .user_id()
            .map_err(|_| DomainError::Token(TokenError::Invalid))?;
        let token_id = claims
            .jti
            .ok_or(DomainError::Token(TokenError::Invalid))?;

        let stored = self
            .token_repository
            .find_by_id(&token_id)
            .await?
            .ok_or(DomainError::Token(TokenError::Invalid))?;

        let hash_matches = constant_time_eq(
            stored.token_hash.as_bytes(),
            hash_token(refresh_token).as_bytes(),
        );
        if !stored.is_valid() || !hash_matches {
            return self.handle_replay(user_id, ip_address).await;
        }

        let user = self
            .user_repository
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::Token(TokenError::Invalid))?;
        if !user.active {
            return Err(DomainError::Auth(AuthError::AccountDisabled));
        }

        self.token_repository.touch(&token_id).await?;
        // Conditional update: a concurrent rotation of the same token
        // loses this race and lands in the replay path.
        let revoked = self
            .token_repository
            .revoke(&token_id, RevokeReason::Rotation)
            .await?;
        if !revoked {
            return self.handle_replay(user_id, ip_address).await;
        }

        let new_token_id = Uuid::new_v4().to_string();
        let access_token = self.tokens.mint_access(&user)?;
        let new_refresh_token =
            self.tokens
                .mint_refresh(user.id, &new_token_id, stored.device_id.as_deref())?;

        let record = RefreshTokenRecord::new(
            new_token_id,
            user.id,
            hash_token(&new_refresh_token),
            Utc::now() + Duration::seconds(self.tokens.refresh_token_expiry()),
        )
        .with_device(stored.device_id.clone(), stored.device_info.clone())
        .with_ip(ip_address);
        self.token_repository.save(record).await?;

        self.audit
            .record(AuthEvent::new(AuthEventType::TokenRefreshed, ip_address).with_user(user.id))
            .await;
        tracing::debug!(user_id = %user.id, "Refresh token rotated");

        Ok(TokenPair::new(
            access_token,
            new_refresh_token,
            self.tokens.access_token_expiry(),
        ))
    }

    /// Revokes the session behind a refresh token
    ///
    /// Best-effort: an unparsable token succeeds silently, so logout is
    /// idempotent from the caller's perspective.
    pub async fn logout(
        &self,
        refresh_token: &str,
        ip_address: &str,
        user_agent: Option<&str>,
    ) -> DomainResult<()> {
        match self.tokens.verify(refresh_token) {
            Ok(claims) => {
                if let Some(token_id) = &claims.jti {
                    let _ = self
                        .token_repository
                        .revoke(token_id, RevokeReason::Logout)
                        .await;
                }
                let mut event =
                    AuthEvent::new(AuthEventType::Logout, ip_address).with_user_agent(user_agent);
                if let Ok(user_id) = claims.user_id() {
                    event = event.with_user(user_id);
                }
                self.audit.record(event).await;
            }
            Err(e) => {
                tracing::debug!(error = %e, "Logout with invalid token");
            }
        }
        Ok(())
    }

    /// Revokes every live refresh token for a principal
    pub async fn logout_all(
        &self,
        user_id: Uuid,
        ip_address: &str,
        user_agent: Option<&str>,
    ) -> DomainResult<usize> {
        let revoked = self
            .token_repository
            .revoke_all_for_user(user_id, RevokeReason::LogoutAll)
            .await?;

        self.audit
            .record(
                AuthEvent::new(AuthEventType::LogoutAll, ip_address)
                    .with_user(user_id)
                    .with_user_agent(user_agent)
                    .with_details("All devices"),
            )
            .await;

        Ok(revoked)
    }

    /// Mass-revokes on a replay signal and fails the rotation
    async fn handle_replay(&self, user_id: Uuid, ip_address: &str) -> DomainResult<TokenPair> {
        tracing::warn!(user_id = %user_id, "Attempted use of a dead refresh token");
        let _ = self
            .token_repository
            .revoke_all_for_user(user_id, RevokeReason::Suspicious)
            .await;
        self.audit
            .record(
                AuthEvent::failure(
                    AuthEventType::TokenRevoked,
                    ip_address,
                    "Refresh token replay detected",
                )
                .with_user(user_id),
            )
            .await;
        Err(DomainError::Token(TokenError::Invalid))
    }
}

/// SHA-256 hash of a token string, base64 encoded
pub(crate) fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    BASE64.encode(hasher.finalize())
}
