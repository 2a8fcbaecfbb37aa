//! Resolve Identity Use Case
//!
//! The authentication gate for every protected request. Checks, in
//! order: the denylist, the credential's signature and expiry, its kind,
//! and finally that the subject still exists. All failures collapse to
//! `Unauthenticated`, so a caller cannot tell a revoked credential from
//! a forged one.

use std::sync::Arc;

use crate::domain::entity::user::User;
use crate::domain::repository::{RevocationStore, UserRepository, denylist_key};
use crate::domain::value_object::email::Email;
use crate::error::{IdentityError, IdentityResult};
use crate::token::{TokenCodec, TokenKind};

/// The identity behind a valid access credential
#[derive(Debug, Clone)]
pub struct ResolvedIdentity {
    /// The subject's user row
    pub user: User,
    /// The raw access credential that was presented
    pub raw_token: String,
}

/// Resolve identity use case
pub struct ResolveIdentityUseCase<R, S>
where
    R: UserRepository,
    S: RevocationStore,
{
    repo: Arc<R>,
    store: Arc<S>,
    codec: Arc<TokenCodec>,
}

impl<R, S> ResolveIdentityUseCase<R, S>
where
    R: UserRepository,
    S: RevocationStore,
{
    pub fn new(repo: Arc<R>, store: Arc<S>, codec: Arc<TokenCodec>) -> Self {
        Self { repo, store, codec }
    }

    pub async fn execute(&self, raw_token: &str) -> IdentityResult<ResolvedIdentity> {
        resolve_subject(self.repo.as_ref(), self.store.as_ref(), &self.codec, raw_token)
            .await
            .map(|user| ResolvedIdentity {
                user,
                raw_token: raw_token.to_string(),
            })
    }
}

/// Shared resolution path for the gate, logout and deactivation
///
/// The denylist is consulted before the credential is parsed, so an
/// explicitly revoked credential is rejected even while it remains
/// cryptographically valid.
pub(crate) async fn resolve_subject<R, S>(
    repo: &R,
    store: &S,
    codec: &TokenCodec,
    raw_token: &str,
) -> IdentityResult<User>
where
    R: UserRepository,
    S: RevocationStore,
{
    if store.get(&denylist_key(raw_token)).await?.is_some() {
        return Err(IdentityError::Unauthenticated);
    }

    let parsed = codec.parse(raw_token)?;

    if parsed.kind != TokenKind::Access {
        // Renewal credentials never authenticate requests directly
        return Err(IdentityError::Unauthenticated);
    }

    let email = Email::new(&parsed.subject).map_err(|_| IdentityError::Unauthenticated)?;

    repo.find_by_email(&email)
        .await?
        .ok_or(IdentityError::Unauthenticated)
}
