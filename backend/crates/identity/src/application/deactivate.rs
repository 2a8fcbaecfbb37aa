//! Deactivate Use Case
//!
//! Terminal account removal. Revokes the caller's session first, then
//! purges every kind of owned content, and deletes the identity row only
//! after the whole cascade has succeeded. A purge failure aborts the
//! cascade early and leaves the identity row in place, so the operation
//! can be retried.

use std::sync::Arc;

use crate::application::logout::revoke_session;
use crate::application::resolve::resolve_subject;
use crate::domain::repository::{ContentStore, RevocationStore, UserRepository};
use crate::error::{IdentityError, IdentityResult};
use crate::token::TokenCodec;

/// Deactivate use case
pub struct DeactivateUseCase<R, S>
where
    R: UserRepository + ContentStore,
    S: RevocationStore,
{
    repo: Arc<R>,
    store: Arc<S>,
    codec: Arc<TokenCodec>,
}

impl<R, S> DeactivateUseCase<R, S>
where
    R: UserRepository + ContentStore,
    S: RevocationStore,
{
    pub fn new(repo: Arc<R>, store: Arc<S>, codec: Arc<TokenCodec>) -> Self {
        Self { repo, store, codec }
    }

    pub async fn execute(&self, raw_token: &str) -> IdentityResult<()> {
        let user = resolve_subject(
            self.repo.as_ref(),
            self.store.as_ref(),
            &self.codec,
            raw_token,
        )
        .await?;

        // Session dies first so no new requests ride on this credential
        // while the cascade runs.
        revoke_session(self.store.as_ref(), &self.codec, &user, raw_token).await?;

        let id = &user.user_id;

        // Sequential per-kind purges, aborting on the first failure.
        // Re-running the cascade after a partial failure is safe: purges
        // of already-emptied kinds delete zero rows.
        let posts = self
            .repo
            .delete_posts_owned_by(id)
            .await
            .map_err(|e| cascade_failure("posts", e))?;
        let likes = self
            .repo
            .delete_likes_owned_by(id)
            .await
            .map_err(|e| cascade_failure("likes", e))?;
        let comments = self
            .repo
            .delete_comments_owned_by(id)
            .await
            .map_err(|e| cascade_failure("comments", e))?;
        let bookings = self
            .repo
            .delete_bookings_owned_by(id)
            .await
            .map_err(|e| cascade_failure("bookings", e))?;
        let scraps = self
            .repo
            .delete_scraps_owned_by(id)
            .await
            .map_err(|e| cascade_failure("scraps", e))?;
        let reviews = self
            .repo
            .delete_reviews_owned_by(id)
            .await
            .map_err(|e| cascade_failure("reviews", e))?;

        self.repo.delete(id).await?;

        tracing::info!(
            user_id = %user.user_id,
            email = %user.email,
            posts,
            likes,
            comments,
            bookings,
            scraps,
            reviews,
            "Identity deactivated"
        );

        Ok(())
    }
}

fn cascade_failure(kind: &str, err: IdentityError) -> IdentityError {
    tracing::error!(content_kind = kind, error = %err, "Content purge failed");
    IdentityError::DeactivationIncomplete(format!("{} purge failed", kind))
}
