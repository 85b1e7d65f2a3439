//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::entity::user::User;

/// Read a missing or `null` string field as empty
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Users
// ============================================================================

/// Create user request
///
/// Missing or `null` fields decode as empty strings so they surface as
/// validation errors rather than malformed bodies.
#[derive(Deserialize)]
pub struct CreateUserRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub password: String,
}

/// Public view of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.value(),
            email: user.email.clone(),
        }
    }
}

// ============================================================================
// Sessions
// ============================================================================

/// Sign in request
#[derive(Deserialize)]
pub struct SessionRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub password: String,
}
