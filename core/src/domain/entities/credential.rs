//! Password credential for partner and admin accounts.
//!
//! Donors and requesters authenticate by OTP only and never own one of
//! these records.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Password credential owned by a single principal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Owning user
    pub user_id: Uuid,

    /// Slow hash of the password, never the plaintext
    pub password_hash: String,

    /// When the password was last changed
    pub password_changed_at: DateTime<Utc>,

    /// Consecutive failed login attempts
    pub failed_login_attempts: i32,

    /// Locked until this instant; set once failures reach the threshold,
    /// cleared on the next successful login
    pub locked_until: Option<DateTime<Utc>>,

    /// Whether the user must change the password at next login
    pub must_change_password: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Credential {
    pub fn new(user_id: Uuid, password_hash: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            password_hash: password_hash.into(),
            password_changed_at: now,
            failed_login_attempts: 0,
            locked_until: None,
            must_change_password: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Records a failed login attempt
    ///
    /// Sets `locked_until` only when the failure count reaches
    /// `max_failures` and no lock is already in place.
    pub fn record_failure(&mut self, max_failures: i32, lock_minutes: i64) {
        self.failed_login_attempts += 1;
        if self.failed_login_attempts >= max_failures && self.locked_until.is_none() {
            self.locked_until = Some(Utc::now() + Duration::minutes(lock_minutes));
        }
        self.updated_at = Utc::now();
    }

    /// Clears the failure counter and any lock after a successful login
    pub fn clear_failures(&mut self) {
        self.failed_login_attempts = 0;
        self.locked_until = None;
        self.updated_at = Utc::now();
    }

    /// Whether the credential is currently locked
    pub fn is_locked(&self) -> bool {
        matches!(self.locked_until, Some(until) if until > Utc::now())
    }

    /// Seconds remaining on an active lock, zero when unlocked
    pub fn locked_for_seconds(&self) -> i64 {
        match self.locked_until {
            Some(until) if until > Utc::now() => (until - Utc::now()).num_seconds().max(1),
            _ => 0,
        }
    }

    /// Replaces the password hash and resets bookkeeping
    pub fn change_password(&mut self, password_hash: impl Into<String>) {
        self.password_hash = password_hash.into();
        self.password_changed_at = Utc::now();
        self.must_change_password = false;
        self.clear_failures();
    }
}
