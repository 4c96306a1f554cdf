//! Main two-factor service implementation

use rand::{rngs::OsRng, Rng};
use std::sync::Arc;
use totp_rs::{Algorithm, Secret, TOTP};
use uuid::Uuid;

use shifa_shared::config::TwoFactorConfig;

use crate::domain::entities::two_factor::TwoFactorRecord;
use crate::domain::entities::user::User;
use crate::domain::value_objects::{TwoFactorSetup, TwoFactorStatus};
use crate::errors::{AuthError, DomainError, DomainResult, TwoFactorError};
use crate::repositories::{TwoFactorRepository, UserRepository};

use super::secret::SecretCipher;

/// TOTP parameters: 6 digits, 30-second step, current and adjacent
/// windows accepted
const TOTP_DIGITS: usize = 6;
const TOTP_SKEW: u8 = 1;
const TOTP_STEP: u64 = 30;

/// Characters used in recovery codes
const RECOVERY_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Service for TOTP-based two-factor authentication
pub struct TwoFactorService<U, F>
where
    U: UserRepository,
    F: TwoFactorRepository,
{
    user_repository: Arc<U>,
    two_factor_repository: Arc<F>,
    cipher: SecretCipher,
    config: TwoFactorConfig,
}

impl<U, F> TwoFactorService<U, F>
where
    U: UserRepository,
    F: TwoFactorRepository,
{
    pub fn new(
        user_repository: Arc<U>,
        two_factor_repository: Arc<F>,
        config: TwoFactorConfig,
    ) -> Self {
        let cipher = SecretCipher::new(&config.secret_encryption_key);
        Self {
            user_repository,
            two_factor_repository,
            cipher,
            config,
        }
    }

    /// Whether two-factor authentication is enabled for a principal
    pub async fn is_enabled(&self, user_id: Uuid) -> DomainResult<bool> {
        Ok(self
            .two_factor_repository
            .find_by_user(user_id)
            .await?
            .map(|record| record.enabled)
            .unwrap_or(false))
    }

    /// Current two-factor state for a principal
    pub async fn status(&self, user_id: Uuid) -> DomainResult<TwoFactorStatus> {
        let record = self.two_factor_repository.find_by_user(user_id).await?;
        Ok(match record {
            Some(record) => TwoFactorStatus {
                enabled: record.enabled,
                enabled_at: record.enabled_at,
                recovery_codes_remaining: record.recovery_codes_remaining(),
            },
            None => TwoFactorStatus {
                enabled: false,
                enabled_at: None,
                recovery_codes_remaining: 0,
            },
        })
    }

    /// Begins a two-factor setup
    ///
    /// Generates a fresh 160-bit secret and a new set of single-use
    /// recovery codes. The plaintext codes are returned exactly once;
    /// only their hashes are stored. The record stays disabled until
    /// [`confirm_setup`](Self::confirm_setup) validates a live code.
    pub async fn initiate_setup(&self, user_id: Uuid) -> DomainResult<TwoFactorSetup> {
        let user = self.require_user(user_id).await?;

        let mut record = self
            .two_factor_repository
            .find_by_user(user_id)
            .await?
            .unwrap_or_else(|| TwoFactorRecord::new(user_id));
        if record.enabled {
            return Err(DomainError::TwoFactor(TwoFactorError::AlreadyEnabled));
        }

        let secret_base32 = Secret::generate_secret().to_encoded().to_string();
        let recovery_codes = self.generate_recovery_codes();
        let recovery_code_hashes = recovery_codes
            .iter()
            .map(|code| bcrypt::hash(code, self.config.hash_cost))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to hash recovery codes: {e}"),
            })?;

        let qr_code_image = self.qr_data_uri(&secret_base32, &user)?;

        record.begin_setup(self.cipher.encrypt(&secret_base32)?, recovery_code_hashes);
        self.two_factor_repository.save(record).await?;

        tracing::info!(user_id = %user_id, "2FA setup initiated");
        Ok(TwoFactorSetup {
            secret: secret_base32,
            qr_code_image,
            recovery_codes,
        })
    }

    /// Confirms a pending setup with a live TOTP code and enables
    /// two-factor authentication
    pub async fn confirm_setup(&self, user_id: Uuid, code: &str) -> DomainResult<()> {
        let user = self.require_user(user_id).await?;
        let mut record = self
            .two_factor_repository
            .find_by_user(user_id)
            .await?
            .filter(|r| r.totp_secret_encrypted.is_some())
            .ok_or(DomainError::TwoFactor(TwoFactorError::NotInitiated))?;

        if record.enabled {
            return Err(DomainError::TwoFactor(TwoFactorError::AlreadyEnabled));
        }

        if !self.check_code(&record, &user, code)? {
            return Err(DomainError::TwoFactor(TwoFactorError::InvalidCode));
        }

        record.enable();
        self.two_factor_repository.save(record).await?;

        tracing::info!(user_id = %user_id, "2FA enabled");
        Ok(())
    }

    /// Verifies a TOTP code against the enabled secret
    ///
    /// Stateless: valid for the current window and one window either
    /// side.
    pub async fn verify_code(&self, user_id: Uuid, code: &str) -> DomainResult<bool> {
        let user = self.require_user(user_id).await?;
        let record = self.require_enabled(user_id).await?;
        self.check_code(&record, &user, code)
    }

    /// Verifies a recovery code and consumes it on a match
    ///
    /// The matched entry is removed from the persisted set before this
    /// returns, so each code works exactly once.
    pub async fn verify_recovery_code(&self, user_id: Uuid, code: &str) -> DomainResult<bool> {
        self.require_user(user_id).await?;
        let mut record = self.require_enabled(user_id).await?;

        let matched = record
            .recovery_code_hashes
            .iter()
            .position(|hash| bcrypt::verify(code, hash).unwrap_or(false));

        match matched {
            Some(index) => {
                record.consume_recovery_code(index);
                let remaining = record.recovery_codes_remaining();
                self.two_factor_repository.save(record).await?;
                tracing::info!(
                    user_id = %user_id,
                    remaining = remaining,
                    "Recovery code used"
                );
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Disables two-factor authentication
    ///
    /// Requires a valid TOTP code as proof of possession; recovery codes
    /// are not accepted here. Clears the secret and all recovery codes.
    pub async fn disable(&self, user_id: Uuid, code: &str) -> DomainResult<()> {
        let user = self.require_user(user_id).await?;
        let mut record = self.require_enabled(user_id).await?;

        if !self.check_code(&record, &user, code)? {
            return Err(DomainError::TwoFactor(TwoFactorError::InvalidCode));
        }

        record.disable();
        self.two_factor_repository.save(record).await?;

        tracing::info!(user_id = %user_id, "2FA disabled");
        Ok(())
    }

    /// Replaces the entire recovery-code set
    ///
    /// Requires a valid TOTP code. Returns the new plaintext codes,
    /// shown exactly once.
    pub async fn regenerate_recovery_codes(
        &self,
        user_id: Uuid,
        code: &str,
    ) -> DomainResult<Vec<String>> {
        let user = self.require_user(user_id).await?;
        let mut record = self.require_enabled(user_id).await?;

        if !self.check_code(&record, &user, code)? {
            return Err(DomainError::TwoFactor(TwoFactorError::InvalidCode));
        }

        let recovery_codes = self.generate_recovery_codes();
        let hashes = recovery_codes
            .iter()
            .map(|c| bcrypt::hash(c, self.config.hash_cost))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to hash recovery codes: {e}"),
            })?;

        record.replace_recovery_codes(hashes);
        self.two_factor_repository.save(record).await?;

        tracing::info!(user_id = %user_id, "Recovery codes regenerated");
        Ok(recovery_codes)
    }

    async fn require_user(&self, user_id: Uuid) -> DomainResult<User> {
        self.user_repository
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::Auth(AuthError::UserNotFound))
    }

    async fn require_enabled(&self, user_id: Uuid) -> DomainResult<TwoFactorRecord> {
        self.two_factor_repository
            .find_by_user(user_id)
            .await?
            .filter(|record| record.enabled)
            .ok_or(DomainError::TwoFactor(TwoFactorError::NotEnabled))
    }

    fn check_code(
        &self,
        record: &TwoFactorRecord,
        user: &User,
        code: &str,
    ) -> DomainResult<bool> {
        let encrypted = record
            .totp_secret_encrypted
            .as_ref()
            .ok_or(DomainError::TwoFactor(TwoFactorError::NotInitiated))?;
        let secret_base32 = self.cipher.decrypt(encrypted)?;
        let totp = self.totp_for(&secret_base32, user)?;
        Ok(totp.check_current(code).unwrap_or(false))
    }

    fn totp_for(&self, secret_base32: &str, user: &User) -> DomainResult<TOTP> {
        let secret_bytes = Secret::Encoded(secret_base32.to_string())
            .to_bytes()
            .map_err(|_| DomainError::Internal {
                message: "Stored TOTP secret is not valid base32".to_string(),
            })?;
        let account = user
            .email
            .clone()
            .unwrap_or_else(|| user.id.to_string());

        TOTP::new(
            Algorithm::SHA1,
            TOTP_DIGITS,
            TOTP_SKEW,
            TOTP_STEP,
            secret_bytes,
            Some(self.config.issuer.clone()),
            account,
        )
        .map_err(|e| DomainError::Internal {
            message: format!("Failed to build TOTP instance: {e}"),
        })
    }

    fn qr_data_uri(&self, secret_base32: &str, user: &User) -> DomainResult<String> {
        let totp = self.totp_for(secret_base32, user)?;
        let png_base64 = totp.get_qr_base64().map_err(|e| DomainError::Internal {
            message: format!("Failed to generate QR code: {e}"),
        })?;
        Ok(format!("data:image/png;base64,{png_base64}"))
    }

    fn generate_recovery_codes(&self) -> Vec<String> {
        let mut rng = OsRng;
        (0..self.config.recovery_code_count)
            .map(|_| {
                let chunks: Vec<String> = (0..3)
                    .map(|_| {
                        (0..4)
                            .map(|_| {
                                let idx = rng.gen_range(0..RECOVERY_ALPHABET.len());
                                RECOVERY_ALPHABET[idx] as char
                            })
                            .collect()
                    })
                    .collect();
                chunks.join("-")
            })
            .collect()
    }
}
