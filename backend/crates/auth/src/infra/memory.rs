//! In-Memory Repository Implementation
//!
//! Process-local store for development and tests. State is lost on restart.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use platform::password::HashedPassword;
use tokio::sync::RwLock;

use crate::domain::entity::{session::SessionRecord, user::User};
use crate::domain::repository::{SessionStore, UserRepository};
use crate::domain::value_object::{email::Email, user_id::UserId};
use crate::error::{AuthError, AuthResult};

/// Persisted shape of a user (the plaintext password never gets here)
#[derive(Clone)]
struct UserRecord {
    email: String,
    encrypted_password: HashedPassword,
}

impl UserRecord {
    fn to_user(&self, id: i64) -> User {
        User::from_stored(
            UserId::from_raw(id),
            self.email.clone(),
            self.encrypted_password.clone(),
        )
    }
}

/// Users, the email index and the ID counter change together
#[derive(Default)]
struct UserTable {
    last_id: i64,
    by_id: HashMap<i64, UserRecord>,
    id_by_email: HashMap<String, i64>,
}

/// In-memory auth repository
///
/// Clones share the same underlying maps.
#[derive(Clone, Default)]
pub struct MemoryAuthRepository {
    users: Arc<RwLock<UserTable>>,
    sessions: Arc<RwLock<HashMap<String, SessionRecord>>>,
}

impl MemoryAuthRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for MemoryAuthRepository {
    async fn create(&self, user: &mut User) -> AuthResult<()> {
        // Hash outside the lock
        user.prepare_for_create()?;
        let record = UserRecord {
            email: user.email.clone(),
            encrypted_password: user.stored_hash()?.clone(),
        };

        let mut table = self.users.write().await;

        if table.id_by_email.contains_key(&record.email) {
            return Err(AuthError::DuplicateEmail);
        }

        table.last_id += 1;
        let id = table.last_id;
        table.id_by_email.insert(record.email.clone(), id);
        table.by_id.insert(id, record);

        user.id = UserId::from_raw(id);

        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> AuthResult<User> {
        let email = Email::normalize(email);
        let table = self.users.read().await;

        table
            .id_by_email
            .get(&email)
            .and_then(|id| table.by_id.get(id).map(|record| record.to_user(*id)))
            .ok_or(AuthError::RecordNotFound)
    }

    async fn find(&self, id: UserId) -> AuthResult<User> {
        let table = self.users.read().await;

        table
            .by_id
            .get(&id.value())
            .map(|record| record.to_user(id.value()))
            .ok_or(AuthError::RecordNotFound)
    }
}

// ============================================================================
// Session Store Implementation
// ============================================================================

impl SessionStore for MemoryAuthRepository {
    async fn find(&self, token: &str) -> AuthResult<Option<SessionRecord>> {
        let now_ms = Utc::now().timestamp_millis();
        let sessions = self.sessions.read().await;

        Ok(sessions
            .get(token)
            .filter(|record| !record.is_expired(now_ms))
            .cloned())
    }

    async fn commit(&self, record: &SessionRecord) -> AuthResult<()> {
        self.sessions
            .write()
            .await
            .insert(record.token.clone(), record.clone());
        Ok(())
    }

    async fn delete(&self, token: &str) -> AuthResult<()> {
        self.sessions.write().await.remove(token);
        Ok(())
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let now_ms = Utc::now().timestamp_millis();
        let mut sessions = self.sessions.write().await;

        let before = sessions.len();
        sessions.retain(|_, record| !record.is_expired(now_ms));
        let deleted = (before - sessions.len()) as u64;

        tracing::debug!(sessions_deleted = deleted, "Cleaned up expired in-memory sessions");

        Ok(deleted)
    }
}
