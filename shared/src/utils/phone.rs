//! Phone number helpers
//!
//! Validation of E.164 formatted numbers and masking for logs and audit
//! records. Raw phone numbers must never appear in log output.

use once_cell::sync::Lazy;
use regex::Regex;

/// E.164 format: + followed by a 1-3 digit country code (no leading 0)
/// and up to 14 digits total
static E164_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+[1-9]\d{6,14}$").unwrap());

/// Check whether a phone number is in valid E.164 format
pub fn is_valid_e164(phone: &str) -> bool {
    E164_REGEX.is_match(phone)
}

/// Mask a phone number for display and logging
///
/// Keeps the first four and last four characters; shorter inputs are
/// fully masked.
pub fn mask_phone(phone: &str) -> String {
    if phone.len() < 8 {
        return String::from("****");
    }
    format!("{}****{}", &phone[..4], &phone[phone.len() - 4..])
}
