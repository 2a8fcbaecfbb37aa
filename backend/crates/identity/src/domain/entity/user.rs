//! User Entity
//!
//! The identity row. Email doubles as the credential subject, so it is
//! unique across the table.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{email::Email, user_id::UserId, user_password::UserPassword};

/// User entity
#[derive(Debug, Clone)]
pub struct User {
    /// Internal UUID identifier
    pub user_id: UserId,
    /// Email address (unique, used as credential subject)
    pub email: Email,
    /// Hashed password
    pub password: UserPassword,
    /// Display nickname
    pub nickname: String,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user
    pub fn new(email: Email, password: UserPassword, nickname: impl Into<String>) -> Self {
        let now = Utc::now();

        Self {
            user_id: UserId::new(),
            email,
            password,
            nickname: nickname.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Bump the updated timestamp after a mutation
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Replace the stored password hash
    pub fn set_password(&mut self, password: UserPassword) {
        self.password = password;
        self.touch();
    }
}
