//! Renew Use Case
//!
//! Exchanges a live renewal credential for a fresh credential pair. The
//! presented credential must match the canonical copy under the
//! identity's `RT:` key byte for byte; a renewal credential orphaned by
//! logout or by a later login is rejected even though its signature
//! still verifies.

use std::sync::Arc;

use crate::domain::repository::{RevocationStore, UserRepository, renewal_key};
use crate::domain::value_object::email::Email;
use crate::error::{IdentityError, IdentityResult};
use crate::token::{Credential, TokenCodec, TokenKind};

/// Renew output
#[derive(Debug)]
pub struct RenewOutput {
    /// Fresh access credential
    pub access: Credential,
    /// Fresh renewal credential (replaces the presented one)
    pub renewal: Credential,
}

/// Renew use case
pub struct RenewUseCase<R, S>
where
    R: UserRepository,
    S: RevocationStore,
{
    repo: Arc<R>,
    store: Arc<S>,
    codec: Arc<TokenCodec>,
}

impl<R, S> RenewUseCase<R, S>
where
    R: UserRepository,
    S: RevocationStore,
{
    pub fn new(repo: Arc<R>, store: Arc<S>, codec: Arc<TokenCodec>) -> Self {
        Self { repo, store, codec }
    }

    pub async fn execute(&self, raw_token: &str) -> IdentityResult<RenewOutput> {
        let parsed = self.codec.parse(raw_token)?;

        if parsed.kind != TokenKind::Renewal {
            return Err(IdentityError::Unauthenticated);
        }

        let email = Email::new(&parsed.subject).map_err(|_| IdentityError::Unauthenticated)?;

        // Canonical-copy check: only the most recently issued renewal
        // credential is live for an identity.
        let canonical = self.store.get(&renewal_key(&email)).await?;
        if canonical.as_deref() != Some(raw_token) {
            return Err(IdentityError::Unauthenticated);
        }

        let user = self
            .repo
            .find_by_email(&email)
            .await?
            .ok_or(IdentityError::Unauthenticated)?;

        let access = self.codec.issue_access(email.as_str())?;
        let renewal = self.codec.issue_renewal(email.as_str())?;

        let ttl = self.codec.remaining_ttl(&renewal.token)?;
        self.store
            .put(&renewal_key(&email), &renewal.token, ttl)
            .await?;

        tracing::info!(
            user_id = %user.user_id,
            email = %user.email,
            "Credentials renewed"
        );

        Ok(RenewOutput { access, renewal })
    }
}
