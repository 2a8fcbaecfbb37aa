//! Identity (Session & Credential) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `token` - Signed access/renewal credential codec
//! - `application/` - Use cases (login, logout, renew, deactivate, resolve)
//! - `infra/` - PostgreSQL, Redis and in-memory implementations
//! - `presentation/` - HTTP handlers, DTOs, router, middleware
//!
//! ## Features
//! - Registration and login with email + password
//! - Self-contained signed credentials (short-lived access, long-lived renewal)
//! - Renewal credentials persisted in an expiring store, one live entry per identity
//! - Revocation via a denylist checked on every authenticated request
//! - Account deactivation with owned-content cascade
//!
//! ## Security Model
//! - Passwords hashed with Argon2id (platform crate)
//! - Credentials signed with HS256 and a process-wide secret
//! - Unknown email and wrong password are indistinguishable to callers
//! - Denylist is consulted before credential parsing, so an explicitly
//!   revoked credential is rejected even while cryptographically valid

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;
pub mod token;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::IdentityConfig;
pub use error::{IdentityError, IdentityResult};
pub use infra::postgres::PgIdentityRepository;
pub use infra::redis::RedisRevocationStore;
pub use presentation::router::identity_router;
pub use token::TokenCodec;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod router {
    pub use crate::presentation::router::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
