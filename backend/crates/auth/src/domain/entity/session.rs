//! Session Record
//!
//! Server-side session state keyed by an opaque cookie token.

use serde_json::{Map, Value};

/// Attribute key holding the authenticated user's ID
pub const USER_ID_KEY: &str = "user_id";

/// Session attributes (string keys, JSON values)
pub type SessionData = Map<String, Value>;

/// Stored session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    /// Opaque random token (cookie value)
    pub token: String,
    /// Session attributes
    pub data: SessionData,
    /// Absolute expiry (Unix milliseconds)
    pub expires_at_ms: i64,
}

impl SessionRecord {
    pub fn new(token: String, data: SessionData, expires_at_ms: i64) -> Self {
        Self {
            token,
            data,
            expires_at_ms,
        }
    }

    /// Expired sessions are never handed out by a store
    pub fn is_expired(&self, now_ms: i64) -> bool {
        self.expires_at_ms <= now_ms
    }
}
