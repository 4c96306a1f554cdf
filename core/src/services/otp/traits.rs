//! Delivery gateway contract.

use async_trait::async_trait;

use crate::domain::entities::otp::OtpChannel;

/// Provider-agnostic OTP delivery contract
///
/// Implementations own their provider-specific wiring; the core only
/// sees a single delivered-or-not outcome per attempt.
#[async_trait]
pub trait SmsGateway: Send + Sync {
    /// Deliver a one-time code
    ///
    /// # Returns
    /// `true` when the provider accepted the message
    async fn send_otp(&self, phone: &str, code: &str, channel: OtpChannel) -> bool;

    /// Whether this gateway can deliver over WhatsApp
    fn supports_whatsapp(&self) -> bool {
        false
    }
}
