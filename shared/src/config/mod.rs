//! Configuration types for the identity services.

mod jwt;
mod lockout;
mod otp;
mod two_factor;

pub use jwt::JwtConfig;
pub use lockout::LockoutConfig;
pub use otp::OtpConfig;
pub use two_factor::TwoFactorConfig;
