//! Unit tests for the session service

use std::sync::Arc;
use uuid::Uuid;

use shifa_shared::config::JwtConfig;

use crate::domain::entities::audit::AuthEventType;
use crate::domain::entities::token::RevokeReason;
use crate::domain::entities::user::{User, UserRole};
use crate::errors::{AuthError, DomainError, TokenError};
use crate::repositories::{
    MockAuditLogRepository, MockTokenRepository, MockUserRepository, TokenRepository,
};
use crate::services::audit::{AuditService, AuditServiceConfig};
use crate::services::session::SessionService;
use crate::services::token::TokenService;

const IP: &str = "10.0.0.1";

struct Fixture {
    service: SessionService<MockTokenRepository, MockUserRepository, MockAuditLogRepository>,
    token_repository: Arc<MockTokenRepository>,
    audit_repository: Arc<MockAuditLogRepository>,
    user: User,
}

async fn fixture() -> Fixture {
    let user = User::provisioned("partner@shifa.org", "Partner", UserRole::PartnerNgo);
    let token_repository = Arc::new(MockTokenRepository::new());
    let user_repository = Arc::new(MockUserRepository::new().with_user(user.clone()).await);
    let audit_repository = Arc::new(MockAuditLogRepository::new());
    let audit = Arc::new(AuditService::new(
        Arc::clone(&audit_repository),
        AuditServiceConfig { async_writes: false },
    ));
    let tokens = Arc::new(TokenService::new(JwtConfig::new(
        "session-test-secret-0123456789abcdef0000",
    )));

    let service = SessionService::new(
        Arc::clone(&token_repository),
        user_repository,
        tokens,
        audit,
    );

    Fixture {
        service,
        token_repository,
        audit_repository,
        user,
    }
}

#[tokio::test]
async fn test_issue_session_returns_tokens_and_persists_hashed_record() {
    let f = fixture().await;

    let response = f
        .service
        .issue_session(&f.user, Some("device-1"), IP, Some("agent"))
        .await
        .unwrap();

    assert!(!response.access_token.as_ref().unwrap().is_empty());
    assert!(!response.refresh_token.as_ref().unwrap().is_empty());
    assert_eq!(response.expires_in, Some(3600));
    assert!(!response.is_challenge());

    let records = f.token_repository.all().await;
    assert_eq!(records.len(), 1);
    // Only a hash is stored, never the raw token
    assert_ne!(
        &records[0].token_hash,
        response.refresh_token.as_ref().unwrap()
    );
    assert_eq!(records[0].device_id.as_deref(), Some("device-1"));
    assert_eq!(records[0].ip_address.as_deref(), Some(IP));

    let events = f
        .audit_repository
        .events_of_type(AuthEventType::LoginSuccess)
        .await;
    assert_eq!(events.len(), 1);
}

#[tokio::test]
async fn test_rotate_returns_fresh_pair_and_revokes_the_old_token() {
    let f = fixture().await;
    let response = f.service.issue_session(&f.user, None, IP, None).await.unwrap();
    let refresh = response.refresh_token.unwrap();

    let pair = f.service.rotate(&refresh, IP).await.unwrap();
    assert_ne!(pair.refresh_token, refresh);
    assert_eq!(pair.expires_in, 3600);

    let records = f.token_repository.all().await;
    assert_eq!(records.len(), 2);
    let old = records.iter().find(|r| r.revoked_at.is_some()).unwrap();
    assert_eq!(old.revoke_reason, Some(RevokeReason::Rotation));
}

#[tokio::test]
async fn test_rotated_token_can_never_be_presented_again() {
    let f = fixture().await;
    let response = f.service.issue_session(&f.user, None, IP, None).await.unwrap();
    let refresh = response.refresh_token.unwrap();

    // First rotation succeeds; the new chain keeps working
    let pair = f.service.rotate(&refresh, IP).await.unwrap();
    assert!(f.service.rotate(&pair.refresh_token, IP).await.is_ok());

    // Replaying the original token fails...
    match f.service.rotate(&refresh, IP).await {
        Err(DomainError::Token(TokenError::Invalid)) => {}
        other => panic!("expected Invalid, got {other:?}"),
    }

    // ...and revokes every live token for the principal
    let live = f
        .token_repository
        .find_active_by_user(f.user.id)
        .await
        .unwrap();
    assert!(live.is_empty());

    let suspicious: Vec<_> = f
        .token_repository
        .all()
        .await
        .into_iter()
        .filter(|r| r.revoke_reason == Some(RevokeReason::Suspicious))
        .collect();
    assert!(!suspicious.is_empty());

    let replay_events = f
        .audit_repository
        .events_of_type(AuthEventType::TokenRevoked)
        .await;
    assert_eq!(replay_events.len(), 1);
    assert!(!replay_events[0].success);
}

#[tokio::test]
async fn test_rotate_rejects_non_refresh_tokens() {
    let f = fixture().await;
    let tokens = TokenService::new(JwtConfig::new("session-test-secret-0123456789abcdef0000"));
    let access = tokens.mint_access(&f.user).unwrap();

    assert!(matches!(
        f.service.rotate(&access, IP).await,
        Err(DomainError::Token(TokenError::Invalid))
    ));
}

#[tokio::test]
async fn test_rotate_rejects_unknown_jti() {
    let f = fixture().await;
    let tokens = TokenService::new(JwtConfig::new("session-test-secret-0123456789abcdef0000"));
    // Signed correctly but never persisted
    let refresh = tokens
        .mint_refresh(f.user.id, &Uuid::new_v4().to_string(), None)
        .unwrap();

    assert!(matches!(
        f.service.rotate(&refresh, IP).await,
        Err(DomainError::Token(TokenError::Invalid))
    ));
}

#[tokio::test]
async fn test_rotate_rejects_disabled_accounts() {
    let f = fixture().await;
    let response = f.service.issue_session(&f.user, None, IP, None).await.unwrap();
    let refresh = response.refresh_token.unwrap();

    // Deactivate after issuance
    let mut disabled = f.user.clone();
    disabled.deactivate();
    let user_repository = Arc::new(MockUserRepository::new().with_user(disabled).await);
    let audit = Arc::new(AuditService::new(
        Arc::new(MockAuditLogRepository::new()),
        AuditServiceConfig { async_writes: false },
    ));
    let tokens = Arc::new(TokenService::new(JwtConfig::new(
        "session-test-secret-0123456789abcdef0000",
    )));
    let service = SessionService::new(
        Arc::clone(&f.token_repository),
        user_repository,
        tokens,
        audit,
    );

    assert!(matches!(
        service.rotate(&refresh, IP).await,
        Err(DomainError::Auth(AuthError::AccountDisabled))
    ));
}

#[tokio::test]
async fn test_logout_revokes_the_session() {
    let f = fixture().await;
    let response = f.service.issue_session(&f.user, None, IP, None).await.unwrap();
    let refresh = response.refresh_token.unwrap();

    f.service.logout(&refresh, IP, None).await.unwrap();

    let live = f
        .token_repository
        .find_active_by_user(f.user.id)
        .await
        .unwrap();
    assert!(live.is_empty());

    // A logged-out token replayed against rotate is a theft signal
    assert!(f.service.rotate(&refresh, IP).await.is_err());
}

#[tokio::test]
async fn test_logout_with_garbage_token_succeeds_silently() {
    let f = fixture().await;
    assert!(f.service.logout("not-a-token", IP, None).await.is_ok());
    assert!(f
        .audit_repository
        .events_of_type(AuthEventType::Logout)
        .await
        .is_empty());
}

#[tokio::test]
async fn test_logout_all_revokes_every_session() {
    let f = fixture().await;
    for _ in 0..3 {
        f.service.issue_session(&f.user, None, IP, None).await.unwrap();
    }

    let revoked = f.service.logout_all(f.user.id, IP, None).await.unwrap();
    assert_eq!(revoked, 3);

    let all = f.token_repository.all().await;
    assert!(all
        .iter()
        .all(|r| r.revoke_reason == Some(RevokeReason::LogoutAll)));

    let events = f
        .audit_repository
        .events_of_type(AuthEventType::LogoutAll)
        .await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].details.as_deref(), Some("All devices"));
}
