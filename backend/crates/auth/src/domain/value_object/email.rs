//! Email Value Object
//!
//! Represents a syntactically valid, normalised email address.
//! Basic validation only - no deliverability checks.

use thiserror::Error;

/// Maximum email length (per RFC 5321)
const EMAIL_MAX_LENGTH: usize = 254;

/// Email validation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EmailError {
    #[error("cannot be blank")]
    Blank,

    #[error("must be a valid email address")]
    Invalid,
}

/// Email address value object
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    /// Create a new email with validation
    ///
    /// Trims and lowercases the input before checking it.
    pub fn new(email: impl AsRef<str>) -> Result<Self, EmailError> {
        let email = Self::normalize(email.as_ref());

        if email.is_empty() {
            return Err(EmailError::Blank);
        }

        if email.len() > EMAIL_MAX_LENGTH || !Self::is_valid_format(&email) {
            return Err(EmailError::Invalid);
        }

        Ok(Self(email))
    }

    /// Normalised lookup key: trimmed and lowercased
    ///
    /// Stores use this for both insert and lookup, so uniqueness is
    /// case-insensitive.
    pub fn normalize(email: &str) -> String {
        email.trim().to_lowercase()
    }

    /// Basic email format validation
    fn is_valid_format(email: &str) -> bool {
        let Some((local, domain)) = email.split_once('@') else {
            return false;
        };

        // Must contain exactly one @
        if domain.contains('@') {
            return false;
        }

        // Local part checks
        if local.is_empty() || local.len() > 64 || local.chars().any(char::is_whitespace) {
            return false;
        }

        // Domain checks
        if domain.is_empty() || !domain.contains('.') {
            return false;
        }

        if !domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        {
            return false;
        }

        // Domain shouldn't start or end with dot or hyphen, nor hold empty labels
        if domain.starts_with('.') || domain.ends_with('.') || domain.contains("..") {
            return false;
        }
        if domain.starts_with('-') || domain.ends_with('-') {
            return false;
        }

        true
    }

    /// Convert to string for storage
    pub fn into_inner(self) -> String {
        self.0
    }
}
