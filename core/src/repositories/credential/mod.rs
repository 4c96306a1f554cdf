//! Credential repository module.

mod r#trait;
pub use r#trait::CredentialRepository;

mod mock;
pub use mock::MockCredentialRepository;
