//! Credential repository trait for password credential persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::credential::Credential;
use crate::errors::DomainError;

/// Repository trait for Credential persistence operations
///
/// Credentials are keyed by their owning user; at most one exists per
/// principal.
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    /// Find the credential owned by a user
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Credential>, DomainError>;

    /// Insert or update a credential
    async fn save(&self, credential: Credential) -> Result<Credential, DomainError>;
}
