//! Main authentication service implementation

use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use shifa_shared::config::{LockoutConfig, TwoFactorConfig};

use crate::domain::entities::audit::{AuthEvent, AuthEventType};
use crate::domain::entities::otp::OtpContext;
use crate::domain::entities::token::TokenType;
use crate::domain::value_objects::AuthResponse;
use crate::errors::{AuthError, DomainError, DomainResult, TokenError, TwoFactorError};
use crate::repositories::{
    AuditLogRepository, CacheStore, CredentialRepository, TokenRepository, TwoFactorRepository,
    UserRepository,
};
use crate::services::audit::AuditService;
use crate::services::session::SessionService;
use crate::services::token::TokenService;
use crate::services::two_factor::TwoFactorService;

const TWO_FACTOR_ATTEMPTS_PREFIX: &str = "2fa_attempts:";

/// Lifetime of the per-login 2FA attempt counter; matches the pending
/// token expiry
const TWO_FACTOR_ATTEMPTS_TTL_SECONDS: i64 = 300;

/// Authentication service orchestrating login, the two-factor challenge,
/// and session issuance
pub struct AuthService<U, C, F, T, K, A>
where
    U: UserRepository,
    C: CredentialRepository,
    F: TwoFactorRepository,
    T: TokenRepository,
    K: CacheStore,
    A: AuditLogRepository + 'static,
{
    user_repository: Arc<U>,
    credential_repository: Arc<C>,
    two_factor: Arc<TwoFactorService<U, F>>,
    session: Arc<SessionService<T, U, A>>,
    tokens: Arc<TokenService>,
    audit: Arc<AuditService<A>>,
    cache: Arc<K>,
    lockout: LockoutConfig,
    two_factor_config: TwoFactorConfig,
}

impl<U, C, F, T, K, A> AuthService<U, C, F, T, K, A>
where
    U: UserRepository,
    C: CredentialRepository,
    F: TwoFactorRepository,
    T: TokenRepository,
    K: CacheStore,
    A: AuditLogRepository + 'static,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_repository: Arc<U>,
        credential_repository: Arc<C>,
        two_factor: Arc<TwoFactorService<U, F>>,
        session: Arc<SessionService<T, U, A>>,
        tokens: Arc<TokenService>,
        audit: Arc<AuditService<A>>,
        cache: Arc<K>,
        lockout: LockoutConfig,
        two_factor_config: TwoFactorConfig,
    ) -> Self {
        Self {
            user_repository,
            credential_repository,
            two_factor,
            session,
            tokens,
            audit,
            cache,
            lockout,
            two_factor_config,
        }
    }

    /// Authenticates an email/password credential
    ///
    /// Evaluates the lockout policy before touching the credential, then
    /// either issues a full session or returns a two-factor challenge.
    /// Unknown email and wrong password fail identically to the caller;
    /// the audit trail records the distinction.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        device_id: Option<&str>,
        ip_address: &str,
        user_agent: Option<&str>,
    ) -> DomainResult<AuthResponse> {
        let email = email.trim().to_lowercase();

        self.check_lockout(&email, ip_address, user_agent).await?;

        let user = match self.user_repository.find_by_email(&email).await? {
            Some(user) => user,
            None => {
                self.audit_login_failure(&email, None, ip_address, user_agent, "USER_NOT_FOUND")
                    .await;
                return Err(DomainError::Auth(AuthError::InvalidCredentials));
            }
        };

        let mut credential = match self.credential_repository.find_by_user(user.id).await? {
            Some(credential) => credential,
            None => {
                self.audit_login_failure(
                    &email,
                    Some(user.id),
                    ip_address,
                    user_agent,
                    "INVALID_PASSWORD",
                )
                .await;
                return Err(DomainError::Auth(AuthError::InvalidCredentials));
            }
        };

        if credential.is_locked() {
            let retry_after_seconds = credential.locked_for_seconds();
            self.audit
                .record(
                    AuthEvent::failure(AuthEventType::AccountLocked, ip_address, "Credential lock")
                        .with_user(user.id)
                        .with_email(email.clone())
                        .with_user_agent(user_agent),
                )
                .await;
            return Err(DomainError::Auth(AuthError::RateLimited {
                retry_after_seconds,
            }));
        }

        if !bcrypt::verify(password, &credential.password_hash).unwrap_or(false) {
            credential.record_failure(
                self.lockout.max_failed_logins as i32,
                self.lockout.credential_lock_minutes,
            );
            self.credential_repository.save(credential).await?;
            self.audit_login_failure(
                &email,
                Some(user.id),
                ip_address,
                user_agent,
                "INVALID_PASSWORD",
            )
            .await;
            return Err(DomainError::Auth(AuthError::InvalidCredentials));
        }

        if !user.active {
            self.audit_login_failure(
                &email,
                Some(user.id),
                ip_address,
                user_agent,
                "ACCOUNT_DISABLED",
            )
            .await;
            return Err(DomainError::Auth(AuthError::AccountDisabled));
        }

        if credential.failed_login_attempts > 0 || credential.locked_until.is_some() {
            credential.clear_failures();
            self.credential_repository.save(credential).await?;
        }

        if self.two_factor.is_enabled(user.id).await? {
            let temp_token = self.tokens.mint_two_factor_pending(user.id)?;
            self.audit
                .record(
                    AuthEvent::new(AuthEventType::TwoFactorChallenge, ip_address)
                        .with_user(user.id)
                        .with_email(email)
                        .with_user_agent(user_agent)
                        .with_details("2FA required"),
                )
                .await;
            return Ok(AuthResponse::challenge(temp_token));
        }

        self.session
            .issue_session(&user, device_id, ip_address, user_agent)
            .await
    }

    /// Completes a challenged login
    ///
    /// Validates the pending token, then consumes exactly one factor per
    /// attempt: the TOTP code when present, otherwise the recovery code.
    /// Failed attempts are bounded per pending login.
    pub async fn verify_two_factor(
        &self,
        temp_token: &str,
        code: Option<&str>,
        recovery_code: Option<&str>,
        device_id: Option<&str>,
        ip_address: &str,
        user_agent: Option<&str>,
    ) -> DomainResult<AuthResponse> {
        let claims = self.tokens.verify(temp_token).map_err(|e| {
            tracing::debug!(error = %e, "Rejected 2FA session token");
            DomainError::Token(TokenError::Invalid)
        })?;
        if claims.token_type != TokenType::TwoFactorPending {
            return Err(DomainError::Token(TokenError::Invalid));
        }

        let user_id = claims
            .user_id()
            .map_err(|_| DomainError::Token(TokenError::Invalid))?;
        let user = self
            .user_repository
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::Auth(AuthError::UserNotFound))?;

        let attempts_key = format!("{TWO_FACTOR_ATTEMPTS_PREFIX}{user_id}");
        let attempts: i64 = match self.cache.get(&attempts_key).await? {
            Some(value) => value.parse().unwrap_or(0),
            None => 0,
        };
        if attempts >= self.two_factor_config.max_login_attempts {
            self.audit
                .record(
                    AuthEvent::failure(
                        AuthEventType::TwoFactorFailed,
                        ip_address,
                        "Too many attempts",
                    )
                    .with_user(user_id)
                    .with_user_agent(user_agent),
                )
                .await;
            return Err(DomainError::TwoFactor(TwoFactorError::TooManyAttempts));
        }

        let (verified, method) = if let Some(code) = code.filter(|c| !c.trim().is_empty()) {
            (self.two_factor.verify_code(user_id, code).await?, "totp")
        } else if let Some(recovery) = recovery_code.filter(|c| !c.trim().is_empty()) {
            (
                self.two_factor.verify_recovery_code(user_id, recovery).await?,
                "recovery",
            )
        } else {
            (false, "totp")
        };

        if !verified {
            let count = self.cache.increment(&attempts_key).await?;
            if count == 1 {
                self.cache
                    .expire(&attempts_key, TWO_FACTOR_ATTEMPTS_TTL_SECONDS)
                    .await?;
            }
            self.audit
                .record(
                    AuthEvent::failure(
                        AuthEventType::TwoFactorFailed,
                        ip_address,
                        format!("Invalid {method} code"),
                    )
                    .with_user(user_id)
                    .with_user_agent(user_agent),
                )
                .await;
            return Err(DomainError::TwoFactor(TwoFactorError::InvalidCode));
        }

        self.cache.delete(&attempts_key).await?;
        self.audit
            .record(
                AuthEvent::new(AuthEventType::TwoFactorSuccess, ip_address)
                    .with_user(user_id)
                    .with_user_agent(user_agent)
                    .with_details(format!("2FA verified via {method}")),
            )
            .await;

        self.session
            .issue_session(&user, device_id, ip_address, user_agent)
            .await
    }

    /// Mints a scoped temp token for an OTP-verified phone
    ///
    /// Consumed by the transport layer after a successful OTP
    /// verification; grants the context's capability set without
    /// creating a principal.
    pub fn issue_temp_token(
        &self,
        phone: &str,
        context: OtpContext,
        reference_id: Uuid,
        tracking_code: &str,
    ) -> DomainResult<String> {
        self.tokens
            .mint_temp(phone, context, reference_id, tracking_code)
    }

    /// Evaluates the trailing-window lockout policy from audit history
    async fn check_lockout(
        &self,
        email: &str,
        ip_address: &str,
        user_agent: Option<&str>,
    ) -> DomainResult<()> {
        let since = Utc::now() - Duration::minutes(self.lockout.window_minutes);

        let failed_by_email = self.audit.failed_logins_by_email(email, since).await?;
        if failed_by_email >= self.lockout.max_failed_logins {
            self.audit
                .record(
                    AuthEvent::failure(
                        AuthEventType::AccountLocked,
                        ip_address,
                        "Email lockout window",
                    )
                    .with_email(email)
                    .with_user_agent(user_agent),
                )
                .await;
            return Err(DomainError::Auth(AuthError::RateLimited {
                retry_after_seconds: 60,
            }));
        }

        let failed_by_ip = self.audit.failed_logins_by_ip(ip_address, since).await?;
        if failed_by_ip >= self.lockout.max_failed_by_ip() {
            self.audit
                .record(
                    AuthEvent::failure(
                        AuthEventType::AccountLocked,
                        ip_address,
                        "IP lockout window",
                    )
                    .with_user_agent(user_agent),
                )
                .await;
            return Err(DomainError::Auth(AuthError::RateLimited {
                retry_after_seconds: self.lockout.window_seconds(),
            }));
        }

        Ok(())
    }

    async fn audit_login_failure(
        &self,
        email: &str,
        user_id: Option<Uuid>,
        ip_address: &str,
        user_agent: Option<&str>,
        reason: &str,
    ) {
        let mut event = AuthEvent::failure(AuthEventType::LoginFailed, ip_address, reason)
            .with_email(email)
            .with_user_agent(user_agent);
        if let Some(user_id) = user_id {
            event = event.with_user(user_id);
        }
        self.audit.record(event).await;
    }

    /// The session engine behind this login surface
    pub fn sessions(&self) -> &SessionService<T, U, A> {
        &self.session
    }

    /// The two-factor machine behind this login surface
    pub fn two_factor(&self) -> &TwoFactorService<U, F> {
        &self.two_factor
    }
}
