//! Audit log repository trait defining the interface for audit persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::audit::AuthEvent;
use crate::errors::DomainError;

/// Repository trait for the append-only audit log
///
/// Writes must be cheap; the audit service runs them off the request
/// path. Reads exist only for the lockout window evaluation.
#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    /// Append an audit event
    async fn record(&self, event: &AuthEvent) -> Result<(), DomainError>;

    /// Count failed login events for an email since the given instant
    async fn count_failed_logins_by_email(
        &self,
        email: &str,
        since: DateTime<Utc>,
    ) -> Result<usize, DomainError>;

    /// Count failed login events from an IP since the given instant
    async fn count_failed_logins_by_ip(
        &self,
        ip_address: &str,
        since: DateTime<Utc>,
    ) -> Result<usize, DomainError>;

    /// Recent events for a user, newest first
    async fn find_by_user(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<AuthEvent>, DomainError>;
}
