//! Mock implementation of TokenRepository for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::token::{RefreshTokenRecord, RevokeReason};
use crate::errors::DomainError;

use super::r#trait::TokenRepository;

/// In-memory refresh token repository for tests
pub struct MockTokenRepository {
    records: Arc<RwLock<HashMap<String, RefreshTokenRecord>>>,
}

impl MockTokenRepository {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// All stored records, for assertions
    pub async fn all(&self) -> Vec<RefreshTokenRecord> {
        let records = self.records.read().await;
        records.values().cloned().collect()
    }
}

impl Default for MockTokenRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenRepository for MockTokenRepository {
    async fn save(&self, record: RefreshTokenRecord) -> Result<RefreshTokenRecord, DomainError> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.id) {
            return Err(DomainError::Internal {
                message: "Token record already exists".to_string(),
            });
        }
        records.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<RefreshTokenRecord>, DomainError> {
        let records = self.records.read().await;
        Ok(records.get(id).cloned())
    }

    async fn find_active_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<RefreshTokenRecord>, DomainError> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|r| r.user_id == user_id && r.is_valid())
            .cloned()
            .collect())
    }

    async fn revoke(&self, id: &str, reason: RevokeReason) -> Result<bool, DomainError> {
        let mut records = self.records.write().await;
        match records.get_mut(id) {
            Some(record) if record.revoked_at.is_none() => {
                record.revoke(reason);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke_all_for_user(
        &self,
        user_id: Uuid,
        reason: RevokeReason,
    ) -> Result<usize, DomainError> {
        let mut records = self.records.write().await;
        let mut count = 0;
        for record in records.values_mut() {
            if record.user_id == user_id && record.revoked_at.is_none() {
                record.revoke(reason);
                count += 1;
            }
        }
        Ok(count)
    }

    async fn touch(&self, id: &str) -> Result<(), DomainError> {
        let mut records = self.records.write().await;
        if let Some(record) = records.get_mut(id) {
            record.record_usage();
        }
        Ok(())
    }

    async fn delete_expired(&self) -> Result<usize, DomainError> {
        let mut records = self.records.write().await;
        let initial_count = records.len();
        records.retain(|_, record| !record.is_expired());
        Ok(initial_count - records.len())
    }
}
