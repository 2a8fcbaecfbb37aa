//! Logout Use Case
//!
//! Revokes the caller's live session: drops the canonical renewal
//! credential and denylists the presented access credential for its
//! remaining lifetime. Logging out twice is not an error; the second
//! call fails resolution because the credential is already denylisted.

use std::sync::Arc;

use crate::domain::entity::user::User;
use crate::domain::repository::{RevocationStore, UserRepository, denylist_key, renewal_key};
use crate::error::IdentityResult;
use crate::token::TokenCodec;

/// Logout use case
pub struct LogoutUseCase<R, S>
where
    R: UserRepository,
    S: RevocationStore,
{
    repo: Arc<R>,
    store: Arc<S>,
    codec: Arc<TokenCodec>,
}

impl<R, S> LogoutUseCase<R, S>
where
    R: UserRepository,
    S: RevocationStore,
{
    pub fn new(repo: Arc<R>, store: Arc<S>, codec: Arc<TokenCodec>) -> Self {
        Self { repo, store, codec }
    }

    pub async fn execute(&self, raw_token: &str) -> IdentityResult<()> {
        let user = super::resolve::resolve_subject(
            self.repo.as_ref(),
            self.store.as_ref(),
            &self.codec,
            raw_token,
        )
        .await?;

        revoke_session(self.store.as_ref(), &self.codec, &user, raw_token).await?;

        tracing::info!(
            user_id = %user.user_id,
            email = %user.email,
            "User logged out"
        );

        Ok(())
    }
}

/// Revoke an identity's session state
///
/// Deletes the canonical renewal credential (idempotent when absent) and
/// denylists the access credential for exactly its remaining lifetime.
/// An already-dead credential gets no denylist entry at all.
pub(crate) async fn revoke_session<S>(
    store: &S,
    codec: &TokenCodec,
    user: &User,
    raw_token: &str,
) -> IdentityResult<()>
where
    S: RevocationStore,
{
    store.delete(&renewal_key(&user.email)).await?;

    let ttl = codec.remaining_ttl(raw_token)?;
    if !ttl.is_zero() {
        // Presence of the key is what matters; the value is a sentinel
        store
            .put(&denylist_key(raw_token), "revoked", ttl)
            .await?;
    }

    Ok(())
}
