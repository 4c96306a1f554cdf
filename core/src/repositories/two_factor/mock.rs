//! Mock implementation of TwoFactorRepository for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::two_factor::TwoFactorRecord;
use crate::errors::DomainError;

use super::r#trait::TwoFactorRepository;

/// In-memory two-factor repository for tests
pub struct MockTwoFactorRepository {
    records: Arc<RwLock<HashMap<Uuid, TwoFactorRecord>>>,
}

impl MockTwoFactorRepository {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for MockTwoFactorRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TwoFactorRepository for MockTwoFactorRepository {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<TwoFactorRecord>, DomainError> {
        let records = self.records.read().await;
        Ok(records.get(&user_id).cloned())
    }

    async fn save(&self, record: TwoFactorRecord) -> Result<TwoFactorRecord, DomainError> {
        let mut records = self.records.write().await;
        records.insert(record.user_id, record.clone());
        Ok(record)
    }
}
