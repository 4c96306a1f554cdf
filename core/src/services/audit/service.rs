//! Audit service for recording authentication attempts and security events.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::task;

use crate::domain::entities::audit::AuthEvent;
use crate::errors::DomainResult;
use crate::repositories::AuditLogRepository;

/// Configuration for the audit service
#[derive(Debug, Clone)]
pub struct AuditServiceConfig {
    /// Whether writes run in a background task
    pub async_writes: bool,
}

impl Default for AuditServiceConfig {
    fn default() -> Self {
        Self { async_writes: true }
    }
}

/// Service managing the append-only audit trail
///
/// A failed write never fails the authentication operation it describes;
/// it is logged for operational monitoring instead.
pub struct AuditService<R>
where
    R: AuditLogRepository,
{
    repository: Arc<R>,
    config: AuditServiceConfig,
}

impl<R> AuditService<R>
where
    R: AuditLogRepository + 'static,
{
    pub fn new(repository: Arc<R>, config: AuditServiceConfig) -> Self {
        Self { repository, config }
    }

    /// Record an event
    ///
    /// With `async_writes` the write is spawned off the request path.
    pub async fn record(&self, event: AuthEvent) {
        if self.config.async_writes {
            let repository = Arc::clone(&self.repository);
            task::spawn(async move {
                if let Err(e) = repository.record(&event).await {
                    tracing::error!(
                        error = %e,
                        event_type = event.event_type.as_str(),
                        "Failed to write audit event"
                    );
                }
            });
        } else if let Err(e) = self.repository.record(&event).await {
            tracing::error!(
                error = %e,
                event_type = event.event_type.as_str(),
                "Failed to write audit event"
            );
        }
    }

    /// Failed login count for an email since the given instant
    pub async fn failed_logins_by_email(
        &self,
        email: &str,
        since: DateTime<Utc>,
    ) -> DomainResult<usize> {
        self.repository
            .count_failed_logins_by_email(email, since)
            .await
    }

    /// Failed login count from an IP since the given instant
    pub async fn failed_logins_by_ip(
        &self,
        ip_address: &str,
        since: DateTime<Utc>,
    ) -> DomainResult<usize> {
        self.repository
            .count_failed_logins_by_ip(ip_address, since)
            .await
    }
}
