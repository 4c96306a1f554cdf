//! Two-factor record repository module.

mod r#trait;
pub use r#trait::TwoFactorRepository;

mod mock;
pub use mock::MockTwoFactorRepository;
