//! Delivery retry wrapper.

use std::time::Duration;

use shifa_shared::utils::phone::mask_phone;

use crate::domain::entities::otp::OtpChannel;

use super::traits::SmsGateway;

/// Retries a delivery with exponential backoff
///
/// A rejected send is treated as transient and retried up to
/// `max_attempts` with the delay doubling each round. Permanent
/// failures (unsupported channel) are classified before this is called.
pub(crate) async fn send_with_retry<G: SmsGateway + ?Sized>(
    gateway: &G,
    phone: &str,
    code: &str,
    channel: OtpChannel,
    max_attempts: u32,
    base_delay: Duration,
) -> bool {
    let mut delay = base_delay;
    for attempt in 1..=max_attempts.max(1) {
        if gateway.send_otp(phone, code, channel).await {
            return true;
        }
        if attempt < max_attempts {
            tracing::warn!(
                phone = %mask_phone(phone),
                attempt = attempt,
                delay_ms = delay.as_millis() as u64,
                "OTP delivery attempt failed, retrying"
            );
            tokio::time::sleep(delay).await;
            delay *= 2;
        }
    }
    false
}
