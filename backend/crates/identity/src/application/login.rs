//! Login Use Case
//!
//! Authenticates an email/password pair and mints a fresh credential
//! pair. The renewal credential is persisted under the identity's `RT:`
//! key, so a second login overwrites the previous renewal credential
//! (last writer wins). Earlier access credentials stay valid until they
//! expire or are explicitly revoked.

use std::sync::Arc;

use crate::domain::repository::{RevocationStore, UserRepository, renewal_key};
use crate::domain::value_object::{email::Email, user_password::RawPassword};
use crate::error::{IdentityError, IdentityResult};
use crate::token::{Credential, TokenCodec};

/// Login input
pub struct LoginInput {
    /// Email address
    pub email: String,
    /// Raw password
    pub password: String,
}

/// Login output
#[derive(Debug)]
pub struct LoginOutput {
    /// Short-lived access credential
    pub access: Credential,
    /// Long-lived renewal credential
    pub renewal: Credential,
}

/// Login use case
pub struct LoginUseCase<R, S>
where
    R: UserRepository,
    S: RevocationStore,
{
    repo: Arc<R>,
    store: Arc<S>,
    codec: Arc<TokenCodec>,
}

impl<R, S> LoginUseCase<R, S>
where
    R: UserRepository,
    S: RevocationStore,
{
    pub fn new(repo: Arc<R>, store: Arc<S>, codec: Arc<TokenCodec>) -> Self {
        Self { repo, store, codec }
    }

    pub async fn execute(&self, input: LoginInput) -> IdentityResult<LoginOutput> {
        // Unknown email, malformed email and wrong password all collapse
        // to the same error so callers cannot enumerate accounts.
        let email = Email::new(&input.email).map_err(|_| IdentityError::InvalidCredentials)?;

        let user = self
            .repo
            .find_by_email(&email)
            .await?
            .ok_or(IdentityError::InvalidCredentials)?;

        let raw = RawPassword::new(input.password)
            .map_err(|_| IdentityError::InvalidCredentials)?;

        if !user.password.verify(&raw) {
            return Err(IdentityError::InvalidCredentials);
        }

        if user.password.needs_rehash() {
            // Rehashing happens on the next password change
            tracing::debug!(
                user_id = %user.user_id,
                "Stored password hash uses outdated parameters"
            );
        }

        let access = self.codec.issue_access(email.as_str())?;
        let renewal = self.codec.issue_renewal(email.as_str())?;

        // Canonical renewal copy, expiring with the credential itself
        let ttl = self.codec.remaining_ttl(&renewal.token)?;
        self.store
            .put(&renewal_key(&email), &renewal.token, ttl)
            .await?;

        tracing::info!(
            user_id = %user.user_id,
            email = %user.email,
            "User logged in"
        );

        Ok(LoginOutput { access, renewal })
    }
}
