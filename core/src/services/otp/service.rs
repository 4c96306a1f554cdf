//! Main OTP service implementation

use rand::{rngs::OsRng, RngCore};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use shifa_shared::config::OtpConfig;
use shifa_shared::utils::phone::mask_phone;

use crate::domain::entities::audit::{AuthEvent, AuthEventType};
use crate::domain::entities::otp::{OtpChannel, OtpContext};
use crate::errors::{DomainError, DomainResult, OtpError};
use crate::repositories::{AuditLogRepository, CacheStore};
use crate::services::audit::AuditService;

use super::retry::send_with_retry;
use super::traits::SmsGateway;

const OTP_KEY_PREFIX: &str = "otp:";
const OTP_ATTEMPTS_PREFIX: &str = "otp_attempts:";
const OTP_RATE_LIMIT_PREFIX: &str = "otp_rate:";

/// Seconds in the fixed rate-limit window
const RATE_LIMIT_WINDOW_SECONDS: i64 = 3600;

/// OTP issuance and verification engine
pub struct OtpService<K, G, A>
where
    K: CacheStore,
    G: SmsGateway,
    A: AuditLogRepository + 'static,
{
    cache: Arc<K>,
    gateway: Arc<G>,
    audit: Arc<AuditService<A>>,
    config: OtpConfig,
}

impl<K, G, A> OtpService<K, G, A>
where
    K: CacheStore,
    G: SmsGateway,
    A: AuditLogRepository + 'static,
{
    pub fn new(
        cache: Arc<K>,
        gateway: Arc<G>,
        audit: Arc<AuditService<A>>,
        config: OtpConfig,
    ) -> Self {
        Self {
            cache,
            gateway,
            audit,
            config,
        }
    }

    /// Generates, stores, and delivers a one-time code
    ///
    /// Exactly one live code exists per `(phone, context, reference)`
    /// key; sending again replaces it and resets the attempt counter.
    /// The stored value is a bcrypt hash, never the code itself.
    ///
    /// # Returns
    /// * `Ok(i64)` - Seconds until the code expires
    /// * `Err(OtpError::RateLimited)` - Hourly per-phone limit reached
    /// * `Err(OtpError::DeliveryFailed)` - Gateway rejected the message
    pub async fn send(
        &self,
        phone: &str,
        channel: OtpChannel,
        context: OtpContext,
        reference_id: Uuid,
        ip_address: &str,
    ) -> DomainResult<i64> {
        self.check_rate_limit(phone, ip_address).await?;

        if channel == OtpChannel::Whatsapp && !self.gateway.supports_whatsapp() {
            tracing::error!(
                phone = %mask_phone(phone),
                "Gateway does not support WhatsApp delivery"
            );
            return Err(DomainError::Otp(OtpError::DeliveryFailed));
        }

        let code = self.generate_code();
        let key = otp_key(phone, context, reference_id);
        let code_hash =
            bcrypt::hash(&code, self.config.hash_cost).map_err(|e| DomainError::Internal {
                message: format!("Failed to hash OTP: {e}"),
            })?;

        self.cache
            .set_with_ttl(&key, &code_hash, self.config.expiry_seconds)
            .await?;
        // A fresh code starts with a clean attempt slate
        self.cache
            .delete(&format!("{OTP_ATTEMPTS_PREFIX}{key}"))
            .await?;

        self.increment_rate_limit(phone).await?;

        let delivered = send_with_retry(
            self.gateway.as_ref(),
            phone,
            &code,
            channel,
            self.config.delivery_max_attempts,
            Duration::from_millis(self.config.delivery_base_delay_ms),
        )
        .await;

        if !delivered {
            // The stored code stays valid for its TTL in case delivery
            // partially succeeded; the caller still sees a failure.
            tracing::error!(phone = %mask_phone(phone), "Failed to deliver OTP");
            self.audit
                .record(
                    AuthEvent::failure(AuthEventType::OtpSent, ip_address, "Delivery failed")
                        .with_phone(mask_phone(phone)),
                )
                .await;
            return Err(DomainError::Otp(OtpError::DeliveryFailed));
        }

        tracing::info!(
            phone = %mask_phone(phone),
            context = context.as_str(),
            channel = channel.as_str(),
            "OTP sent"
        );
        self.audit
            .record(
                AuthEvent::new(AuthEventType::OtpSent, ip_address)
                    .with_phone(mask_phone(phone))
                    .with_details(context.as_str()),
            )
            .await;

        Ok(self.config.expiry_seconds)
    }

    /// Verifies a presented code
    ///
    /// Attempts are bounded; a match deletes both the code and the
    /// attempt counter, enforcing one-time use.
    ///
    /// # Returns
    /// * `Err(OtpError::TooManyAttempts)` - Attempt budget exhausted;
    ///   the stored code is not even consulted
    /// * `Err(OtpError::Expired)` - No live code under this key
    /// * `Err(OtpError::InvalidCode)` - Mismatch, with the remaining
    ///   attempt count
    pub async fn verify(
        &self,
        phone: &str,
        code: &str,
        context: OtpContext,
        reference_id: Uuid,
        ip_address: &str,
    ) -> DomainResult<()> {
        let key = otp_key(phone, context, reference_id);
        let attempts_key = format!("{OTP_ATTEMPTS_PREFIX}{key}");

        let attempts: i64 = match self.cache.get(&attempts_key).await? {
            Some(value) => value.parse().unwrap_or(0),
            None => 0,
        };
        if attempts >= self.config.max_attempts {
            tracing::warn!(phone = %mask_phone(phone), "Max OTP attempts exceeded");
            self.audit
                .record(
                    AuthEvent::failure(
                        AuthEventType::OtpFailed,
                        ip_address,
                        "Max attempts exceeded",
                    )
                    .with_phone(mask_phone(phone)),
                )
                .await;
            return Err(DomainError::Otp(OtpError::TooManyAttempts));
        }

        let stored_hash = match self.cache.get(&key).await? {
            Some(hash) => hash,
            None => {
                tracing::debug!(phone = %mask_phone(phone), "OTP not found or expired");
                self.audit
                    .record(
                        AuthEvent::failure(AuthEventType::OtpExpired, ip_address, "No live code")
                            .with_phone(mask_phone(phone)),
                    )
                    .await;
                return Err(DomainError::Otp(OtpError::Expired));
            }
        };

        let matches = bcrypt::verify(code, &stored_hash).unwrap_or(false);
        if !matches {
            self.cache.increment(&attempts_key).await?;
            // The counter lives exactly as long as the code it guards
            let remaining_ttl = self
                .cache
                .remaining_ttl(&key)
                .await?
                .unwrap_or(self.config.expiry_seconds);
            self.cache.expire(&attempts_key, remaining_ttl).await?;

            let remaining_attempts = self.config.max_attempts - attempts - 1;
            tracing::debug!(
                phone = %mask_phone(phone),
                remaining_attempts = remaining_attempts,
                "Invalid OTP"
            );
            self.audit
                .record(
                    AuthEvent::failure(AuthEventType::OtpFailed, ip_address, "Invalid code")
                        .with_phone(mask_phone(phone)),
                )
                .await;
            return Err(DomainError::Otp(OtpError::InvalidCode {
                remaining_attempts,
            }));
        }

        // One-time use: the code and its counter are gone before the
        // caller hears about the match
        self.cache.delete(&key).await?;
        self.cache.delete(&attempts_key).await?;

        tracing::info!(phone = %mask_phone(phone), "OTP verified");
        self.audit
            .record(
                AuthEvent::new(AuthEventType::OtpVerified, ip_address)
                    .with_phone(mask_phone(phone)),
            )
            .await;
        Ok(())
    }

    /// Seconds until the hourly rate limit resets, zero when no limit is
    /// active
    pub async fn retry_after(&self, phone: &str) -> DomainResult<i64> {
        let ttl = self
            .cache
            .remaining_ttl(&format!("{OTP_RATE_LIMIT_PREFIX}{phone}"))
            .await?;
        Ok(ttl.filter(|t| *t > 0).unwrap_or(0))
    }

    async fn check_rate_limit(&self, phone: &str, ip_address: &str) -> DomainResult<()> {
        let rate_key = format!("{OTP_RATE_LIMIT_PREFIX}{phone}");
        let count: i64 = match self.cache.get(&rate_key).await? {
            Some(value) => value.parse().unwrap_or(0),
            None => 0,
        };

        if count >= self.config.rate_limit_per_hour {
            let retry_after_seconds = self
                .cache
                .remaining_ttl(&rate_key)
                .await?
                .filter(|t| *t > 0)
                .unwrap_or(RATE_LIMIT_WINDOW_SECONDS);
            tracing::warn!(phone = %mask_phone(phone), "OTP rate limit exceeded");
            self.audit
                .record(
                    AuthEvent::failure(
                        AuthEventType::OtpRateLimited,
                        ip_address,
                        "Hourly limit reached",
                    )
                    .with_phone(mask_phone(phone)),
                )
                .await;
            return Err(DomainError::Otp(OtpError::RateLimited {
                retry_after_seconds,
            }));
        }
        Ok(())
    }

    async fn increment_rate_limit(&self, phone: &str) -> DomainResult<()> {
        let rate_key = format!("{OTP_RATE_LIMIT_PREFIX}{phone}");
        let count = self.cache.increment(&rate_key).await?;
        if count == 1 {
            // First send in this window arms the fixed one-hour TTL
            self.cache
                .expire(&rate_key, RATE_LIMIT_WINDOW_SECONDS)
                .await?;
        }
        Ok(())
    }

    /// Cryptographically random zero-padded numeric code
    fn generate_code(&self) -> String {
        let mut rng = OsRng;
        let mut bytes = [0u8; 8];
        rng.fill_bytes(&mut bytes);
        let bound = 10u64.pow(self.config.length);
        let code = u64::from_le_bytes(bytes) % bound;
        format!("{:0width$}", code, width = self.config.length as usize)
    }
}

fn otp_key(phone: &str, context: OtpContext, reference_id: Uuid) -> String {
    format!("{OTP_KEY_PREFIX}{phone}:{}:{reference_id}", context.as_str())
}
