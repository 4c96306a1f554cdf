//! Two-factor repository trait for TOTP record persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::two_factor::TwoFactorRecord;
use crate::errors::DomainError;

/// Repository trait for TwoFactorRecord persistence operations
///
/// The two-factor service is the only mutator of these records. Saving
/// must replace the stored recovery-code set atomically so a consumed
/// code can never be observed again.
#[async_trait]
pub trait TwoFactorRepository: Send + Sync {
    /// Find the two-factor record owned by a user
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<TwoFactorRecord>, DomainError>;

    /// Insert or update a two-factor record
    async fn save(&self, record: TwoFactorRecord) -> Result<TwoFactorRecord, DomainError>;
}
