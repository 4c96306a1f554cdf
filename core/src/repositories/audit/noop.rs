//! No-op audit repository for deployments without an audit sink.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::audit::AuthEvent;
use crate::errors::DomainError;

use super::r#trait::AuditLogRepository;

/// Discards every event and reports zero failures
pub struct NoOpAuditLogRepository;

#[async_trait]
impl AuditLogRepository for NoOpAuditLogRepository {
    async fn record(&self, _event: &AuthEvent) -> Result<(), DomainError> {
        Ok(())
    }

    async fn count_failed_logins_by_email(
        &self,
        _email: &str,
        _since: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        Ok(0)
    }

    async fn count_failed_logins_by_ip(
        &self,
        _ip_address: &str,
        _since: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        Ok(0)
    }

    async fn find_by_user(
        &self,
        _user_id: Uuid,
        _limit: usize,
    ) -> Result<Vec<AuthEvent>, DomainError> {
        Ok(Vec::new())
    }
}
