//! In-Memory Implementations
//!
//! Backends for tests and local development, no PostgreSQL or Redis
//! required. The revocation store honors TTLs with lazy expiry; the
//! repository supports injected purge failures for exercising the
//! deactivation cascade.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::entity::user::User;
use crate::domain::repository::{ContentStore, RevocationStore, UserRepository};
use crate::domain::value_object::{email::Email, user_id::UserId};
use crate::error::{IdentityError, IdentityResult};

// ============================================================================
// Revocation Store
// ============================================================================

/// In-memory expiring key-value store
#[derive(Default)]
pub struct MemoryRevocationStore {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl MemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) entries
    pub async fn live_entries(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .await
            .values()
            .filter(|(_, deadline)| *deadline > now)
            .count()
    }
}

impl RevocationStore for MemoryRevocationStore {
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> IdentityResult<()> {
        let deadline = Instant::now() + ttl;
        self.entries
            .lock()
            .await
            .insert(key.to_string(), (value.to_string(), deadline));
        Ok(())
    }

    async fn get(&self, key: &str) -> IdentityResult<Option<String>> {
        let mut entries = self.entries.lock().await;

        // Lazy expiry on read
        if let Some((_, deadline)) = entries.get(key)
            && *deadline <= Instant::now()
        {
            entries.remove(key);
            return Ok(None);
        }

        Ok(entries.get(key).map(|(value, _)| value.clone()))
    }

    async fn delete(&self, key: &str) -> IdentityResult<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

// ============================================================================
// Identity Repository
// ============================================================================

/// In-memory user repository and content store
#[derive(Default)]
pub struct MemoryIdentityRepository {
    users: Mutex<HashMap<Uuid, User>>,
    content: Mutex<HashMap<(Uuid, &'static str), u64>>,
    failing_purges: Mutex<HashSet<&'static str>>,
}

impl MemoryIdentityRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed owned content of a given kind for a user
    pub async fn seed_content(&self, user_id: &UserId, kind: &'static str, count: u64) {
        self.content
            .lock()
            .await
            .insert((*user_id.as_uuid(), kind), count);
    }

    /// Remaining content count of a given kind for a user
    pub async fn content_count(&self, user_id: &UserId, kind: &'static str) -> u64 {
        self.content
            .lock()
            .await
            .get(&(*user_id.as_uuid(), kind))
            .copied()
            .unwrap_or(0)
    }

    /// Make every purge of the given kind fail
    pub async fn fail_purges_of(&self, kind: &'static str) {
        self.failing_purges.lock().await.insert(kind);
    }

    pub async fn user_count(&self) -> usize {
        self.users.lock().await.len()
    }

    async fn purge(&self, user_id: &UserId, kind: &'static str) -> IdentityResult<u64> {
        if self.failing_purges.lock().await.contains(kind) {
            return Err(IdentityError::Internal(format!(
                "injected {} purge failure",
                kind
            )));
        }

        Ok(self
            .content
            .lock()
            .await
            .remove(&(*user_id.as_uuid(), kind))
            .unwrap_or(0))
    }
}

impl UserRepository for MemoryIdentityRepository {
    async fn create(&self, user: &User) -> IdentityResult<()> {
        self.users
            .lock()
            .await
            .insert(*user.user_id.as_uuid(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> IdentityResult<Option<User>> {
        Ok(self.users.lock().await.get(user_id.as_uuid()).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> IdentityResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .await
            .values()
            .find(|u| u.email == *email)
            .cloned())
    }

    async fn exists_by_email(&self, email: &Email) -> IdentityResult<bool> {
        Ok(self
            .users
            .lock()
            .await
            .values()
            .any(|u| u.email == *email))
    }

    async fn delete(&self, user_id: &UserId) -> IdentityResult<()> {
        self.users.lock().await.remove(user_id.as_uuid());
        Ok(())
    }
}

impl ContentStore for MemoryIdentityRepository {
    async fn delete_posts_owned_by(&self, user_id: &UserId) -> IdentityResult<u64> {
        self.purge(user_id, "posts").await
    }

    async fn delete_comments_owned_by(&self, user_id: &UserId) -> IdentityResult<u64> {
        self.purge(user_id, "comments").await
    }

    async fn delete_likes_owned_by(&self, user_id: &UserId) -> IdentityResult<u64> {
        self.purge(user_id, "likes").await
    }

    async fn delete_bookings_owned_by(&self, user_id: &UserId) -> IdentityResult<u64> {
        self.purge(user_id, "bookings").await
    }

    async fn delete_scraps_owned_by(&self, user_id: &UserId) -> IdentityResult<u64> {
        self.purge(user_id, "scraps").await
    }

    async fn delete_reviews_owned_by(&self, user_id: &UserId) -> IdentityResult<u64> {
        self.purge(user_id, "reviews").await
    }
}
