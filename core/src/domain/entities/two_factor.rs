//! Two-factor authentication record.
//!
//! Stores the TOTP secret (encrypted at rest) and the hashed single-use
//! recovery codes. Recovery codes are enforced single-use by removal
//! from the set, not by a separate flag.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Two-factor settings owned by a single principal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwoFactorRecord {
    /// Owning user
    pub user_id: Uuid,

    /// Encrypted base32 TOTP secret; present only while enabled or
    /// mid-setup
    pub totp_secret_encrypted: Option<String>,

    /// Whether two-factor authentication is active
    pub enabled: bool,

    /// When two-factor authentication was enabled
    pub enabled_at: Option<DateTime<Utc>>,

    /// Hashes of the remaining single-use recovery codes
    pub recovery_code_hashes: Vec<String>,

    /// How many recovery codes have been consumed
    pub recovery_codes_used: i32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TwoFactorRecord {
    pub fn new(user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            totp_secret_encrypted: None,
            enabled: false,
            enabled_at: None,
            recovery_code_hashes: Vec::new(),
            recovery_codes_used: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Stores a fresh secret and recovery set; leaves the record disabled
    /// until the setup is confirmed with a live code
    pub fn begin_setup(&mut self, secret_encrypted: String, recovery_code_hashes: Vec<String>) {
        self.totp_secret_encrypted = Some(secret_encrypted);
        self.recovery_code_hashes = recovery_code_hashes;
        self.recovery_codes_used = 0;
        self.enabled = false;
        self.enabled_at = None;
        self.updated_at = Utc::now();
    }

    /// Activates two-factor authentication after a confirmed setup
    pub fn enable(&mut self) {
        self.enabled = true;
        self.enabled_at = Some(Utc::now());
        self.updated_at = Utc::now();
    }

    /// Disables two-factor authentication, clearing the secret and all
    /// recovery codes
    pub fn disable(&mut self) {
        self.enabled = false;
        self.enabled_at = None;
        self.totp_secret_encrypted = None;
        self.recovery_code_hashes.clear();
        self.recovery_codes_used = 0;
        self.updated_at = Utc::now();
    }

    /// Removes the recovery code at `index` from the set
    ///
    /// Single-use is enforced by this removal: a matched code is gone
    /// from the persisted set before the verification returns.
    pub fn consume_recovery_code(&mut self, index: usize) {
        if index < self.recovery_code_hashes.len() {
            self.recovery_code_hashes.remove(index);
            self.recovery_codes_used += 1;
            self.updated_at = Utc::now();
        }
    }

    /// Replaces the entire recovery set
    pub fn replace_recovery_codes(&mut self, recovery_code_hashes: Vec<String>) {
        self.recovery_code_hashes = recovery_code_hashes;
        self.recovery_codes_used = 0;
        self.updated_at = Utc::now();
    }

    /// Recovery codes still available
    pub fn recovery_codes_remaining(&self) -> usize {
        self.recovery_code_hashes.len()
    }
}
