//! Lookup Identity Use Case
//!
//! Administrative lookup by id. Unlike the authentication gate, absence
//! is reported as `IdentityNotFound` rather than collapsed into
//! `Unauthenticated`; this path never decides whether a request is
//! allowed, only whether the identity exists.

use std::sync::Arc;

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::user_id::UserId;
use crate::error::{IdentityError, IdentityResult};

/// Lookup identity use case
pub struct LookupIdentityUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
}

impl<R> LookupIdentityUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, user_id: &UserId) -> IdentityResult<User> {
        self.repo
            .find_by_id(user_id)
            .await?
            .ok_or(IdentityError::IdentityNotFound)
    }
}
