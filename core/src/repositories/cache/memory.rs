//! In-memory cache store.
//!
//! Backs the service tests and single-node development runs. Expiry is
//! evaluated lazily on access; `increment` is made atomic by the
//! store-wide lock.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::errors::DomainError;

use super::r#trait::CacheStore;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self) -> bool {
        matches!(self.expires_at, Some(at) if at <= Instant::now())
    }
}

/// In-memory `CacheStore` implementation
pub struct MemoryCacheStore {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if entry.is_expired() => {
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn set_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl_seconds: i64,
    ) -> Result<(), DomainError> {
        let mut entries = self.entries.lock().await;
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Some(Instant::now() + Duration::from_secs(ttl_seconds.max(0) as u64)),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), DomainError> {
        let mut entries = self.entries.lock().await;
        entries.remove(key);
        Ok(())
    }

    async fn increment(&self, key: &str) -> Result<i64, DomainError> {
        let mut entries = self.entries.lock().await;
        let expired = entries.get(key).map(Entry::is_expired).unwrap_or(false);
        if expired {
            entries.remove(key);
        }

        let entry = entries.entry(key.to_string()).or_insert(Entry {
            value: String::from("0"),
            expires_at: None,
        });
        let current: i64 = entry.value.parse().map_err(|_| DomainError::Internal {
            message: format!("Counter at {key} holds a non-numeric value"),
        })?;
        let next = current + 1;
        entry.value = next.to_string();
        Ok(next)
    }

    async fn expire(&self, key: &str, ttl_seconds: i64) -> Result<bool, DomainError> {
        let mut entries = self.entries.lock().await;
        match entries.get_mut(key) {
            Some(entry) if !entry.is_expired() => {
                entry.expires_at =
                    Some(Instant::now() + Duration::from_secs(ttl_seconds.max(0) as u64));
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn remaining_ttl(&self, key: &str) -> Result<Option<i64>, DomainError> {
        let entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if !entry.is_expired() => Ok(entry
                .expires_at
                .map(|at| at.saturating_duration_since(Instant::now()).as_secs() as i64)),
            _ => Ok(None),
        }
    }
}
