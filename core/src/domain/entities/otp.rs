//! OTP context and delivery channel types.
//!
//! One-time codes themselves live only in the ephemeral TTL store as
//! bcrypt hashes; no durable entity exists for them.

use serde::{Deserialize, Serialize};

use super::permission::Permission;

/// Context for OTP verification, determining what a verified caller may
/// do afterwards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OtpContext {
    /// OTP for a donation submission, allows image upload
    Donation,
    /// OTP for a medicine request submission
    Request,
}

impl OtpContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Donation => "DONATION",
            Self::Request => "REQUEST",
        }
    }

    /// Permissions granted after OTP verification in this context
    pub fn granted_permissions(&self) -> Vec<Permission> {
        match self {
            Self::Donation => vec![Permission::DonationUploadImage, Permission::DonationViewOwn],
            Self::Request => vec![Permission::RequestViewOwn],
        }
    }
}

/// Delivery channel for one-time codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OtpChannel {
    Sms,
    Whatsapp,
}

impl OtpChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sms => "SMS",
            Self::Whatsapp => "WHATSAPP",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_donation_context_grants_upload() {
        let perms = OtpContext::Donation.granted_permissions();
        assert!(perms.contains(&Permission::DonationUploadImage));
        assert!(!perms.contains(&Permission::RequestViewOwn));
    }

    #[test]
    fn test_request_context_grants_view_own_only() {
        assert_eq!(
            OtpContext::Request.granted_permissions(),
            vec![Permission::RequestViewOwn]
        );
    }

    #[test]
    fn test_channel_names() {
        assert_eq!(OtpChannel::Sms.as_str(), "SMS");
        assert_eq!(OtpChannel::Whatsapp.as_str(), "WHATSAPP");
    }
}
