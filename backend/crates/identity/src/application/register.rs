//! Register Use Case
//!
//! Creates a new identity from an email, password and nickname.

use std::sync::Arc;

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email, user_id::UserId, user_password::RawPassword, user_password::UserPassword,
};
use crate::error::{IdentityError, IdentityResult};

/// Register input
pub struct RegisterInput {
    /// Email address
    pub email: String,
    /// Raw password
    pub password: String,
    /// Display nickname
    pub nickname: String,
}

/// Register output
#[derive(Debug)]
pub struct RegisterOutput {
    /// Assigned user ID
    pub user_id: UserId,
    /// Normalized email
    pub email: Email,
}

/// Register use case
pub struct RegisterUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
}

impl<R> RegisterUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, input: RegisterInput) -> IdentityResult<RegisterOutput> {
        // Validation errors surface verbatim; registration is not a
        // credential check, so there is nothing to hide here.
        let email = Email::new(&input.email)?;
        let raw = RawPassword::new(input.password)?;

        if self.repo.exists_by_email(&email).await? {
            return Err(IdentityError::EmailTaken);
        }

        let password = UserPassword::from_raw(&raw)?;
        let user = User::new(email.clone(), password, input.nickname);

        self.repo.create(&user).await?;

        tracing::info!(
            user_id = %user.user_id,
            email = %user.email,
            "Identity registered"
        );

        Ok(RegisterOutput {
            user_id: user.user_id,
            email,
        })
    }
}
