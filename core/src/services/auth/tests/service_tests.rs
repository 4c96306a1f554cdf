//! Unit tests for the authentication service

use std::sync::Arc;
use totp_rs::{Algorithm, Secret, TOTP};
use uuid::Uuid;

use shifa_shared::config::{JwtConfig, LockoutConfig, TwoFactorConfig};

use crate::domain::entities::audit::AuthEventType;
use crate::domain::entities::credential::Credential;
use crate::domain::entities::user::{User, UserRole};
use crate::errors::{AuthError, DomainError, TokenError, TwoFactorError};
use crate::repositories::{
    CredentialRepository, MemoryCacheStore, MockAuditLogRepository, MockCredentialRepository,
    MockTokenRepository, MockTwoFactorRepository, MockUserRepository, UserRepository,
};
use crate::services::audit::{AuditService, AuditServiceConfig};
use crate::services::auth::AuthService;
use crate::services::session::SessionService;
use crate::services::token::TokenService;
use crate::services::two_factor::TwoFactorService;

const IP: &str = "10.0.0.1";
const PASSWORD: &str = "correct-horse-battery";
const JWT_SECRET: &str = "auth-test-secret-0123456789abcdef00000000";

type TestAuthService = AuthService<
    MockUserRepository,
    MockCredentialRepository,
    MockTwoFactorRepository,
    MockTokenRepository,
    MemoryCacheStore,
    MockAuditLogRepository,
>;

struct Fixture {
    service: TestAuthService,
    user: User,
    user_repository: Arc<MockUserRepository>,
    credential_repository: Arc<MockCredentialRepository>,
    audit_repository: Arc<MockAuditLogRepository>,
}

async fn fixture_for(user: User) -> Fixture {
    let credential = Credential::new(user.id, bcrypt::hash(PASSWORD, 4).unwrap());

    let user_repository = Arc::new(MockUserRepository::new().with_user(user.clone()).await);
    let credential_repository =
        Arc::new(MockCredentialRepository::new().with_credential(credential).await);
    let two_factor_repository = Arc::new(MockTwoFactorRepository::new());
    let token_repository = Arc::new(MockTokenRepository::new());
    let audit_repository = Arc::new(MockAuditLogRepository::new());

    let audit = Arc::new(AuditService::new(
        Arc::clone(&audit_repository),
        AuditServiceConfig { async_writes: false },
    ));
    let tokens = Arc::new(TokenService::new(JwtConfig::new(JWT_SECRET)));
    let two_factor_config = TwoFactorConfig {
        hash_cost: 4,
        ..TwoFactorConfig::default()
    };
    let two_factor = Arc::new(TwoFactorService::new(
        Arc::clone(&user_repository),
        two_factor_repository,
        two_factor_config.clone(),
    ));
    let session = Arc::new(SessionService::new(
        token_repository,
        Arc::clone(&user_repository),
        Arc::clone(&tokens),
        Arc::clone(&audit),
    ));
    let lockout = LockoutConfig::default();

    let service = AuthService::new(
        Arc::clone(&user_repository),
        Arc::clone(&credential_repository),
        two_factor,
        session,
        tokens,
        audit,
        Arc::new(MemoryCacheStore::new()),
        lockout,
        two_factor_config,
    );

    Fixture {
        service,
        user,
        user_repository,
        credential_repository,
        audit_repository,
    }
}

async fn partner_fixture() -> Fixture {
    fixture_for(User::provisioned(
        "partner@shifa.org",
        "Partner",
        UserRole::PartnerPharmacy,
    ))
    .await
}

async fn admin_fixture() -> Fixture {
    fixture_for(User::provisioned("admin@shifa.org", "Admin", UserRole::Admin)).await
}

/// Generates the code an authenticator app would show right now
fn current_code(secret_base32: &str, account: &str) -> String {
    let totp = TOTP::new(
        Algorithm::SHA1,
        6,
        1,
        30,
        Secret::Encoded(secret_base32.to_string()).to_bytes().unwrap(),
        Some("Shifa".to_string()),
        account.to_string(),
    )
    .unwrap();
    totp.generate_current().unwrap()
}

/// Enables 2FA for the fixture user and returns the base32 secret and
/// the plaintext recovery codes
async fn enable_two_factor(f: &Fixture) -> (String, Vec<String>) {
    let setup = f.service.two_factor().initiate_setup(f.user.id).await.unwrap();
    let code = current_code(&setup.secret, f.user.email.as_deref().unwrap());
    f.service
        .two_factor()
        .confirm_setup(f.user.id, &code)
        .await
        .unwrap();
    (setup.secret, setup.recovery_codes)
}

#[tokio::test]
async fn test_login_without_2fa_returns_full_tokens() {
    let f = partner_fixture().await;

    let response = f
        .service
        .login("partner@shifa.org", PASSWORD, Some("device-1"), IP, Some("agent"))
        .await
        .unwrap();

    assert!(!response.access_token.as_ref().unwrap().is_empty());
    assert!(!response.refresh_token.as_ref().unwrap().is_empty());
    assert_eq!(response.expires_in, Some(3600));
    assert!(response.requires_two_factor.is_none());
    assert!(response.temp_token.is_none());

    // Last login was stamped
    let stored = f
        .user_repository
        .find_by_id(f.user.id)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.last_login_at.is_some());

    let events = f
        .audit_repository
        .events_of_type(AuthEventType::LoginSuccess)
        .await;
    assert_eq!(events.len(), 1);
}

#[tokio::test]
async fn test_email_is_normalized_before_lookup() {
    let f = partner_fixture().await;
    assert!(f
        .service
        .login("  Partner@Shifa.ORG  ", PASSWORD, None, IP, None)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_unknown_email_and_wrong_password_fail_identically() {
    let f = partner_fixture().await;

    let unknown = f
        .service
        .login("ghost@shifa.org", PASSWORD, None, IP, None)
        .await;
    let wrong = f
        .service
        .login("partner@shifa.org", "wrong-password", None, IP, None)
        .await;

    // The caller sees the same failure either way
    assert!(matches!(
        unknown,
        Err(DomainError::Auth(AuthError::InvalidCredentials))
    ));
    assert!(matches!(
        wrong,
        Err(DomainError::Auth(AuthError::InvalidCredentials))
    ));

    // The audit trail keeps the distinction
    let events = f
        .audit_repository
        .events_of_type(AuthEventType::LoginFailed)
        .await;
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].details.as_deref(), Some("USER_NOT_FOUND"));
    assert_eq!(events[1].details.as_deref(), Some("INVALID_PASSWORD"));
}

#[tokio::test]
async fn test_disabled_account_is_rejected_after_password_check() {
    let mut user = User::provisioned("partner@shifa.org", "Partner", UserRole::PartnerNgo);
    user.deactivate();
    let f = fixture_for(user).await;

    assert!(matches!(
        f.service
            .login("partner@shifa.org", PASSWORD, None, IP, None)
            .await,
        Err(DomainError::Auth(AuthError::AccountDisabled))
    ));

    let events = f
        .audit_repository
        .events_of_type(AuthEventType::LoginFailed)
        .await;
    assert_eq!(events[0].details.as_deref(), Some("ACCOUNT_DISABLED"));
}

#[tokio::test]
async fn test_sixth_attempt_is_locked_out_even_with_the_correct_password() {
    let f = partner_fixture().await;

    for _ in 0..5 {
        let _ = f
            .service
            .login("partner@shifa.org", "wrong-password", None, IP, None)
            .await;
    }

    match f
        .service
        .login("partner@shifa.org", PASSWORD, None, IP, None)
        .await
    {
        Err(DomainError::Auth(AuthError::RateLimited {
            retry_after_seconds,
        })) => assert!(retry_after_seconds > 0),
        other => panic!("expected RateLimited, got {other:?}"),
    }

    let events = f
        .audit_repository
        .events_of_type(AuthEventType::AccountLocked)
        .await;
    assert!(!events.is_empty());
}

#[tokio::test]
async fn test_ip_threshold_is_double_the_email_threshold() {
    let f = partner_fixture().await;

    // Ten failures from one IP spread across distinct emails: no single
    // email trips, the IP does
    for i in 0..10 {
        let _ = f
            .service
            .login(&format!("ghost{i}@shifa.org"), "wrong", None, IP, None)
            .await;
    }

    assert!(matches!(
        f.service
            .login("partner@shifa.org", PASSWORD, None, IP, None)
            .await,
        Err(DomainError::Auth(AuthError::RateLimited { .. }))
    ));

    // A different IP is unaffected
    assert!(f
        .service
        .login("partner@shifa.org", PASSWORD, None, "10.9.9.9", None)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_locked_credential_is_rejected_with_retry_hint() {
    let user = User::provisioned("partner@shifa.org", "Partner", UserRole::PartnerNgo);
    let f = fixture_for(user.clone()).await;

    // Lock the credential directly; the audit window stays clean
    let mut credential = f
        .credential_repository
        .find_by_user(user.id)
        .await
        .unwrap()
        .unwrap();
    for _ in 0..5 {
        credential.record_failure(5, 15);
    }
    f.credential_repository.save(credential).await.unwrap();

    match f
        .service
        .login("partner@shifa.org", PASSWORD, None, IP, None)
        .await
    {
        Err(DomainError::Auth(AuthError::RateLimited {
            retry_after_seconds,
        })) => assert!(retry_after_seconds > 0 && retry_after_seconds <= 15 * 60),
        other => panic!("expected RateLimited, got {other:?}"),
    }
}

#[tokio::test]
async fn test_successful_login_clears_the_failure_counter() {
    let f = partner_fixture().await;

    for _ in 0..2 {
        let _ = f
            .service
            .login("partner@shifa.org", "wrong", None, IP, None)
            .await;
    }
    f.service
        .login("partner@shifa.org", PASSWORD, None, IP, None)
        .await
        .unwrap();

    let credential = f
        .credential_repository
        .find_by_user(f.user.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(credential.failed_login_attempts, 0);
    assert!(credential.locked_until.is_none());
}

#[tokio::test]
async fn test_login_with_2fa_returns_a_challenge_not_tokens() {
    let f = admin_fixture().await;
    enable_two_factor(&f).await;

    let response = f
        .service
        .login("admin@shifa.org", PASSWORD, None, IP, None)
        .await
        .unwrap();

    assert_eq!(response.requires_two_factor, Some(true));
    assert!(response.temp_token.is_some());
    assert!(response.access_token.is_none());
    assert!(response.refresh_token.is_none());
    assert_eq!(response.methods, Some(vec![String::from("TOTP")]));

    let events = f
        .audit_repository
        .events_of_type(AuthEventType::TwoFactorChallenge)
        .await;
    assert_eq!(events.len(), 1);
    // No session was issued yet
    assert!(f
        .audit_repository
        .events_of_type(AuthEventType::LoginSuccess)
        .await
        .is_empty());
}

#[tokio::test]
async fn test_totp_code_completes_a_challenged_login() {
    let f = admin_fixture().await;
    let (secret, _) = enable_two_factor(&f).await;

    let challenge = f
        .service
        .login("admin@shifa.org", PASSWORD, None, IP, None)
        .await
        .unwrap();
    let temp_token = challenge.temp_token.unwrap();

    let code = current_code(&secret, "admin@shifa.org");
    let response = f
        .service
        .verify_two_factor(&temp_token, Some(&code), None, None, IP, None)
        .await
        .unwrap();

    assert!(!response.access_token.unwrap().is_empty());
    assert_eq!(response.expires_in, Some(3600));

    let events = f
        .audit_repository
        .events_of_type(AuthEventType::TwoFactorSuccess)
        .await;
    assert_eq!(events[0].details.as_deref(), Some("2FA verified via totp"));
}

#[tokio::test]
async fn test_recovery_code_completes_a_challenged_login_once() {
    let f = admin_fixture().await;
    let (_, recovery_codes) = enable_two_factor(&f).await;

    let challenge = f
        .service
        .login("admin@shifa.org", PASSWORD, None, IP, None)
        .await
        .unwrap();
    let temp_token = challenge.temp_token.unwrap();

    let response = f
        .service
        .verify_two_factor(
            &temp_token,
            None,
            Some(&recovery_codes[0]),
            None,
            IP,
            None,
        )
        .await
        .unwrap();
    assert!(response.access_token.is_some());

    let events = f
        .audit_repository
        .events_of_type(AuthEventType::TwoFactorSuccess)
        .await;
    assert_eq!(
        events[0].details.as_deref(),
        Some("2FA verified via recovery")
    );

    // The code was consumed
    let status = f.service.two_factor().status(f.user.id).await.unwrap();
    assert_eq!(status.recovery_codes_remaining, 9);
}

#[tokio::test]
async fn test_wrong_2fa_code_fails_and_is_bounded() {
    let f = admin_fixture().await;
    enable_two_factor(&f).await;

    let challenge = f
        .service
        .login("admin@shifa.org", PASSWORD, None, IP, None)
        .await
        .unwrap();
    let temp_token = challenge.temp_token.unwrap();

    for _ in 0..5 {
        assert!(matches!(
            f.service
                .verify_two_factor(&temp_token, Some("000000"), None, None, IP, None)
                .await,
            Err(DomainError::TwoFactor(TwoFactorError::InvalidCode))
        ));
    }

    // The sixth attempt is cut off before any code is checked
    assert!(matches!(
        f.service
            .verify_two_factor(&temp_token, Some("000000"), None, None, IP, None)
            .await,
        Err(DomainError::TwoFactor(TwoFactorError::TooManyAttempts))
    ));

    let events = f
        .audit_repository
        .events_of_type(AuthEventType::TwoFactorFailed)
        .await;
    assert_eq!(events.len(), 6);
}

#[tokio::test]
async fn test_non_pending_tokens_are_rejected_for_2fa_completion() {
    let f = admin_fixture().await;
    enable_two_factor(&f).await;

    // An access token is the wrong type even though the signature is valid
    let tokens = TokenService::new(JwtConfig::new(JWT_SECRET));
    let access = tokens.mint_access(&f.user).unwrap();

    assert!(matches!(
        f.service
            .verify_two_factor(&access, Some("123456"), None, None, IP, None)
            .await,
        Err(DomainError::Token(TokenError::Invalid))
    ));

    assert!(matches!(
        f.service
            .verify_two_factor("garbage", Some("123456"), None, None, IP, None)
            .await,
        Err(DomainError::Token(TokenError::Invalid))
    ));
}

#[tokio::test]
async fn test_temp_tokens_carry_the_context_capability_set() {
    let f = partner_fixture().await;
    let reference = Uuid::new_v4();

    let token = f
        .service
        .issue_temp_token(
            "+201234567890",
            crate::domain::entities::otp::OtpContext::Donation,
            reference,
            "TRK-7",
        )
        .unwrap();

    let tokens = TokenService::new(JwtConfig::new(JWT_SECRET));
    let claims = tokens.verify(&token).unwrap();
    assert_eq!(claims.sub, "phone:+201234567890");
    assert_eq!(claims.tracking_code.as_deref(), Some("TRK-7"));
}
