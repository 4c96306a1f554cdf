//! Mock implementation of AuditLogRepository for testing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::audit::{AuthEvent, AuthEventType};
use crate::errors::DomainError;

use super::r#trait::AuditLogRepository;

/// In-memory audit log for tests
pub struct MockAuditLogRepository {
    events: Arc<RwLock<Vec<AuthEvent>>>,
}

impl MockAuditLogRepository {
    pub fn new() -> Self {
        Self {
            events: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// All recorded events, for assertions
    pub async fn events(&self) -> Vec<AuthEvent> {
        let events = self.events.read().await;
        events.clone()
    }

    /// Events of a given type, for assertions
    pub async fn events_of_type(&self, event_type: AuthEventType) -> Vec<AuthEvent> {
        let events = self.events.read().await;
        events
            .iter()
            .filter(|e| e.event_type == event_type)
            .cloned()
            .collect()
    }
}

impl Default for MockAuditLogRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuditLogRepository for MockAuditLogRepository {
    async fn record(&self, event: &AuthEvent) -> Result<(), DomainError> {
        let mut events = self.events.write().await;
        events.push(event.clone());
        Ok(())
    }

    async fn count_failed_logins_by_email(
        &self,
        email: &str,
        since: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        let events = self.events.read().await;
        Ok(events
            .iter()
            .filter(|e| {
                e.event_type == AuthEventType::LoginFailed
                    && !e.success
                    && e.email.as_deref() == Some(email)
                    && e.created_at >= since
            })
            .count())
    }

    async fn count_failed_logins_by_ip(
        &self,
        ip_address: &str,
        since: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        let events = self.events.read().await;
        Ok(events
            .iter()
            .filter(|e| {
                e.event_type == AuthEventType::LoginFailed
                    && !e.success
                    && e.ip_address == ip_address
                    && e.created_at >= since
            })
            .count())
    }

    async fn find_by_user(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<AuthEvent>, DomainError> {
        let events = self.events.read().await;
        let mut matching: Vec<AuthEvent> = events
            .iter()
            .filter(|e| e.user_id == Some(user_id))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matching.truncate(limit);
        Ok(matching)
    }
}
