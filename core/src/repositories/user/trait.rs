//! User repository trait defining the interface for principal persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::user::User;
use crate::errors::DomainError;

/// Repository trait for User entity persistence operations
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by their unique ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError>;

    /// Find a user by normalized (lowercase) email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Find a user by E.164 phone number
    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, DomainError>;

    /// Persist a new user
    ///
    /// # Returns
    /// * `Ok(User)` - The saved user
    /// * `Err(DomainError)` - Save failed (e.g. duplicate email or phone)
    async fn create(&self, user: User) -> Result<User, DomainError>;

    /// Update an existing user
    async fn update(&self, user: User) -> Result<User, DomainError>;
}
