//! Infrastructure Layer
//!
//! PostgreSQL, Redis and in-memory implementations of the domain traits.
//! The in-memory backends serve tests and local development.

pub mod memory;
pub mod postgres;
pub mod redis;

pub use postgres::PgIdentityRepository;
pub use redis::RedisRevocationStore;
