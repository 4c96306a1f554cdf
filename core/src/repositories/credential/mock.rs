//! Mock implementation of CredentialRepository for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::credential::Credential;
use crate::errors::DomainError;

use super::r#trait::CredentialRepository;

/// In-memory credential repository for tests
pub struct MockCredentialRepository {
    credentials: Arc<RwLock<HashMap<Uuid, Credential>>>,
}

impl MockCredentialRepository {
    pub fn new() -> Self {
        Self {
            credentials: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Seed the repository with an existing credential
    pub async fn with_credential(self, credential: Credential) -> Self {
        self.credentials
            .write()
            .await
            .insert(credential.user_id, credential);
        self
    }
}

impl Default for MockCredentialRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialRepository for MockCredentialRepository {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Credential>, DomainError> {
        let credentials = self.credentials.read().await;
        Ok(credentials.get(&user_id).cloned())
    }

    async fn save(&self, credential: Credential) -> Result<Credential, DomainError> {
        let mut credentials = self.credentials.write().await;
        credentials.insert(credential.user_id, credential.clone());
        Ok(credential)
    }
}
