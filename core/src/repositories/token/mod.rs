//! Refresh token repository module.

mod r#trait;
pub use r#trait::TokenRepository;

mod mock;
pub use mock::MockTokenRepository;
