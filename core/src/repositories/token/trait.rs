//! Token repository trait defining the interface for refresh token persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::token::{RefreshTokenRecord, RevokeReason};
use crate::errors::DomainError;

/// Repository trait for RefreshTokenRecord persistence operations
///
/// Records are keyed by the token's `jti`. Exactly one valid record
/// exists per issued refresh token; revocation is terminal.
///
/// # Concurrency
/// `revoke` must be a conditional single-row update: it returns `false`
/// when the record is missing or already revoked. Two concurrent
/// rotations of the same `jti` therefore cannot both succeed: the
/// loser observes `false` and treats the token as replayed.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Persist a new refresh token record
    async fn save(&self, record: RefreshTokenRecord) -> Result<RefreshTokenRecord, DomainError>;

    /// Find a record by its token ID (`jti`)
    async fn find_by_id(&self, id: &str) -> Result<Option<RefreshTokenRecord>, DomainError>;

    /// Find all valid (unexpired, unrevoked) records for a user
    async fn find_active_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<RefreshTokenRecord>, DomainError>;

    /// Conditionally revoke a record
    ///
    /// # Returns
    /// * `Ok(true)` - Record was live and is now revoked
    /// * `Ok(false)` - Record missing or already revoked
    async fn revoke(&self, id: &str, reason: RevokeReason) -> Result<bool, DomainError>;

    /// Revoke every non-revoked record for a user
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of records revoked
    async fn revoke_all_for_user(
        &self,
        user_id: Uuid,
        reason: RevokeReason,
    ) -> Result<usize, DomainError>;

    /// Record that a token was presented for rotation
    async fn touch(&self, id: &str) -> Result<(), DomainError>;

    /// Delete expired records; intended for periodic cleanup
    async fn delete_expired(&self) -> Result<usize, DomainError>;
}
