//! Repository Traits
//!
//! Interfaces for data persistence. Implementations live in the
//! infrastructure layer.

use std::time::Duration;

use crate::domain::entity::user::User;
use crate::domain::value_object::{email::Email, user_id::UserId};
use crate::error::IdentityResult;

/// Revocation-store key for the canonical renewal credential of an identity
///
/// One entry per identity; a second login overwrites it.
pub fn renewal_key(email: &Email) -> String {
    format!("RT:{}", email.as_str())
}

/// Revocation-store key for a denylisted access credential
///
/// Keyed by the raw token so each revoked credential gets its own entry.
pub fn denylist_key(raw_token: &str) -> String {
    format!("BL:{}", raw_token)
}

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Create a new user
    async fn create(&self, user: &User) -> IdentityResult<()>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: &UserId) -> IdentityResult<Option<User>>;

    /// Find user by email
    async fn find_by_email(&self, email: &Email) -> IdentityResult<Option<User>>;

    /// Check if an email is already registered
    async fn exists_by_email(&self, email: &Email) -> IdentityResult<bool>;

    /// Delete a user row
    async fn delete(&self, user_id: &UserId) -> IdentityResult<()>;
}

/// Owned-content store trait
///
/// Bulk deletes for everything an identity owns, one method per content
/// kind. Each returns the number of rows removed. Used only by the
/// deactivation cascade.
#[trait_variant::make(ContentStore: Send)]
pub trait LocalContentStore {
    async fn delete_posts_owned_by(&self, user_id: &UserId) -> IdentityResult<u64>;

    async fn delete_comments_owned_by(&self, user_id: &UserId) -> IdentityResult<u64>;

    async fn delete_likes_owned_by(&self, user_id: &UserId) -> IdentityResult<u64>;

    async fn delete_bookings_owned_by(&self, user_id: &UserId) -> IdentityResult<u64>;

    async fn delete_scraps_owned_by(&self, user_id: &UserId) -> IdentityResult<u64>;

    async fn delete_reviews_owned_by(&self, user_id: &UserId) -> IdentityResult<u64>;
}

/// Expiring key-value store trait
///
/// Backs both namespaces: `RT:` canonical renewal credentials and `BL:`
/// denylisted access credentials. Every entry carries a TTL; the store
/// expires entries on its own, no sweeper needed.
#[trait_variant::make(RevocationStore: Send)]
pub trait LocalRevocationStore {
    /// Store a value under a key with a time-to-live
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> IdentityResult<()>;

    /// Fetch a live value, `None` when absent or expired
    async fn get(&self, key: &str) -> IdentityResult<Option<String>>;

    /// Remove a key. Idempotent: deleting an absent key succeeds.
    async fn delete(&self, key: &str) -> IdentityResult<()>;
}
