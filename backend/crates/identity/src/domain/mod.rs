//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::user::User;
pub use repository::{ContentStore, RevocationStore, UserRepository};
pub use value_object::{email::Email, user_id::UserId, user_password::UserPassword};
