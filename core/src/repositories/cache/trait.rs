//! Ephemeral store contract for OTP codes and counters.

use async_trait::async_trait;

use crate::errors::DomainError;

/// Contract for the volatile TTL-backed store
///
/// Keys are opaque strings. OTP code hashes, attempt counters, and
/// rate-limit counters live here and nowhere else; none of this state
/// is ever promoted to durable storage.
///
/// # Concurrency
/// `increment` must be atomic at the store level: concurrent callers on
/// the same key each observe a distinct counter value.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Get the value at a key, `None` if absent or expired
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Set a value with a time-to-live in seconds
    async fn set_with_ttl(&self, key: &str, value: &str, ttl_seconds: i64)
        -> Result<(), DomainError>;

    /// Delete a key; absent keys are not an error
    async fn delete(&self, key: &str) -> Result<(), DomainError>;

    /// Atomically increment the counter at a key, creating it at 1
    ///
    /// A freshly created counter has no TTL until `expire` is called.
    async fn increment(&self, key: &str) -> Result<i64, DomainError>;

    /// Set the TTL of an existing key
    ///
    /// # Returns
    /// * `Ok(true)` - TTL applied
    /// * `Ok(false)` - Key does not exist
    async fn expire(&self, key: &str, ttl_seconds: i64) -> Result<bool, DomainError>;

    /// Remaining TTL in seconds, `None` if the key is absent or has no TTL
    async fn remaining_ttl(&self, key: &str) -> Result<Option<i64>, DomainError>;
}
