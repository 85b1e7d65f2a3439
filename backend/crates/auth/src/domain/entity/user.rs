//! User Entity
//!
//! Account record plus the rules that gate its creation.

use std::fmt;

use platform::password::{ClearTextPassword, HashedPassword};
use serde::Serialize;
use thiserror::Error;

use crate::domain::value_object::{email::Email, user_id::UserId};
use crate::error::{AuthError, AuthResult};

/// One failed field check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// All field failures for a user, ordered by field name
///
/// Renders as `email: must be a valid email address; password: cannot be blank.`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", render_fields(.fields))]
pub struct UserValidationError {
    fields: Vec<FieldError>,
}

fn render_fields(fields: &[FieldError]) -> String {
    let joined = fields
        .iter()
        .map(|f| format!("{}: {}", f.field, f.message))
        .collect::<Vec<_>>()
        .join("; ");
    format!("{joined}.")
}

/// User entity
///
/// `password` only lives for the duration of a create or credential check.
/// Serialisation exposes `id` and `email` only.
#[derive(Serialize)]
pub struct User {
    /// Store-assigned identifier (`0` until created)
    pub id: UserId,
    /// Email address (normalised by [`User::prepare_for_create`])
    pub email: String,
    /// Transient plaintext password
    #[serde(skip)]
    pub password: Option<ClearTextPassword>,
    /// Persisted Argon2id hash
    #[serde(skip)]
    pub encrypted_password: Option<HashedPassword>,
}

impl User {
    /// Create an unsaved user from registration input
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            id: UserId::UNASSIGNED,
            email: email.into(),
            password: Some(ClearTextPassword::new(password.into())),
            encrypted_password: None,
        }
    }

    /// Rebuild a persisted user
    pub fn from_stored(id: UserId, email: String, encrypted_password: HashedPassword) -> Self {
        Self {
            id,
            email,
            password: None,
            encrypted_password: Some(encrypted_password),
        }
    }

    /// Check the user against the creation rules
    ///
    /// A password is required unless a hash is already present, and must
    /// satisfy the length policy whenever it is given. Returns the
    /// normalised email on success.
    pub fn validate(&self) -> Result<Email, UserValidationError> {
        let mut fields = Vec::new();

        let email = match Email::new(&self.email) {
            Ok(email) => Some(email),
            Err(e) => {
                fields.push(FieldError {
                    field: "email",
                    message: e.to_string(),
                });
                None
            }
        };

        let password_error = match &self.password {
            Some(password) if !password.is_empty() || self.encrypted_password.is_none() => {
                password.validate_policy().err().map(|e| e.to_string())
            }
            Some(_) => None,
            None if self.encrypted_password.is_none() => Some("cannot be blank".to_string()),
            None => None,
        };
        if let Some(message) = password_error {
            fields.push(FieldError {
                field: "password",
                message,
            });
        }

        match email {
            Some(email) if fields.is_empty() => Ok(email),
            _ => Err(UserValidationError { fields }),
        }
    }

    /// Prepare for persistence: hash a given password
    pub fn before_create(&mut self) -> AuthResult<()> {
        if let Some(password) = self.password.as_ref().filter(|p| !p.is_empty()) {
            self.encrypted_password = Some(password.hash()?);
        }

        Ok(())
    }

    /// Validate, normalise the email, then prepare; every store runs this
    /// before inserting
    pub fn prepare_for_create(&mut self) -> AuthResult<()> {
        self.email = self.validate()?.into_inner();
        self.before_create()
    }

    /// Hash ready for storage
    pub fn stored_hash(&self) -> AuthResult<&HashedPassword> {
        self.encrypted_password
            .as_ref()
            .ok_or_else(|| AuthError::Internal("user has no password hash".to_string()))
    }

    /// Drop the plaintext password
    pub fn sanitize(&mut self) {
        self.password = None;
    }

    /// Whether `candidate` matches the stored hash
    pub fn compare_password(&self, candidate: &str) -> bool {
        let Some(hash) = &self.encrypted_password else {
            return false;
        };
        hash.verify(&ClearTextPassword::new(candidate.to_string()))
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("has_password", &self.password.is_some())
            .finish()
    }
}
