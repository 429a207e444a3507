//! User entity.

use crate::{Entity, UserId};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A registered user.
///
/// Reviews, the watchlist and watched movies belong to the user but are
/// reached through the repository rather than embedded here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct User {
    pub id: UserId,

    #[validate(length(max = 64))]
    pub first_name: String,

    #[validate(length(max = 64))]
    pub last_name: String,

    /// Unique login name.
    #[validate(length(min = 1, max = 64))]
    pub username: String,

    /// Hashed password (never exposed via API).
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    #[validate(email)]
    pub email: String,

    #[validate(range(max = 150))]
    pub age: Option<u32>,

    /// Whether the user agreed to the terms of use.
    pub consent: bool,
}

impl User {
    /// Creates a user without age and without consent.
    #[must_use]
    pub fn new(
        id: UserId,
        username: impl Into<String>,
        password_hash: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id,
            first_name: String::new(),
            last_name: String::new(),
            username: username.into(),
            password_hash: password_hash.into(),
            email: email.into(),
            age: None,
            consent: false,
        }
    }

    /// Sets the user's names.
    #[must_use]
    pub fn with_names(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self.last_name = last_name.into();
        self
    }

    /// Sets the user's age.
    #[must_use]
    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    /// Sets the consent flag.
    #[must_use]
    pub fn with_consent(mut self, consent: bool) -> Self {
        self.consent = consent;
        self
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &UserId {
        &self.id
    }
}
