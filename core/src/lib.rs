//! # Shifa Identity Core
//!
//! Authentication and token lifecycle engine for the Shifa platform.
//! This crate contains the domain entities, business services, repository
//! contracts, and error types behind the three authentication modes:
//! phone OTP for anonymous donors and requesters, password login for
//! partner accounts, and password plus TOTP two-factor for admins.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
