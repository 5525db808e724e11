//! Accounts and API tokens
//!
//! An [`Account`] is the login identity; the catalog-side [`Client`](super::Client)
//! record hangs off it one-to-one.

use crate::core::error::{FieldValidationError, ValidationError};
use crate::core::validation::{FieldChecks, validate_email, validate_max_length, validate_username};
use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimum accepted password length
pub const MIN_PASSWORD_LENGTH: usize = 8;

const NAME_MAX_LENGTH: usize = 150;

/// A login identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Argon2 PHC string, never serialized
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub is_superuser: bool,
    pub date_joined: DateTime<Utc>,
}

impl Account {
    pub fn new(registration: &Registration, password_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: registration.username.trim().to_string(),
            first_name: registration.first_name.trim().to_string(),
            last_name: registration.last_name.trim().to_string(),
            email: registration.email.trim().to_string(),
            password_hash,
            is_superuser: false,
            date_joined: now,
        }
    }
}

/// Sign-up form: account fields plus a confirmed password
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Registration {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

impl Registration {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password1: password.to_string(),
            password2: password.to_string(),
            ..Default::default()
        }
    }

    pub fn with_names(mut self, first_name: &str, last_name: &str) -> Self {
        self.first_name = first_name.to_string();
        self.last_name = last_name.to_string();
        self
    }

    /// Checks that need no storage access; username uniqueness is the store's job
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut checks = FieldChecks::new();
        checks
            .check(validate_username("username", self.username.trim()))
            .check(validate_max_length("first_name", &self.first_name, NAME_MAX_LENGTH))
            .check(validate_max_length("last_name", &self.last_name, NAME_MAX_LENGTH))
            .check_some(
                Some(self.email.trim()).filter(|e| !e.is_empty()),
                |email| validate_email("email", email),
            );

        if self.password1.chars().count() < MIN_PASSWORD_LENGTH {
            checks.check(Err(FieldValidationError::new(
                "password1",
                format!(
                    "This password is too short. It must contain at least {} characters.",
                    MIN_PASSWORD_LENGTH
                ),
            )));
        }
        if self.password1 != self.password2 {
            checks.check(Err(FieldValidationError::new(
                "password2",
                "The two password fields didn't match.",
            )));
        }
        checks.finish()
    }
}

/// Opaque bearer credential issued at login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiToken {
    /// 40 lowercase hex characters
    pub key: String,
    pub account_id: Uuid,
    pub created: DateTime<Utc>,
}

impl ApiToken {
    /// Fresh random key for `account_id`
    pub fn generate(account_id: Uuid, now: DateTime<Utc>) -> Self {
        let mut bytes = [0u8; 20];
        rand::rng().fill_bytes(&mut bytes);
        Self {
            key: hex::encode(bytes),
            account_id,
            created: now,
        }
    }
}
