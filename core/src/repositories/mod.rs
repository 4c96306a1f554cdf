//! Repository contracts for the durable and ephemeral stores.
//!
//! The core owns only these interfaces; concrete MySQL/Redis adapters
//! live outside this crate. Each contract ships an in-memory mock used
//! by the service tests.

pub mod audit;
pub mod cache;
pub mod credential;
pub mod token;
pub mod two_factor;
pub mod user;

pub use audit::{AuditLogRepository, MockAuditLogRepository, NoOpAuditLogRepository};
pub use cache::{CacheStore, MemoryCacheStore};
pub use credential::{CredentialRepository, MockCredentialRepository};
pub use token::{MockTokenRepository, TokenRepository};
pub use two_factor::{MockTwoFactorRepository, TwoFactorRepository};
pub use user::{MockUserRepository, UserRepository};
