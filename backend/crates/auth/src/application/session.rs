//! Session Manager
//!
//! Loads the session named by the request cookie into a request-scoped
//! [`Session`] handle and commits whatever the handler changed.
//!
//! Lifecycle per request:
//! 1. `load` - look the token up; unknown, expired or tampered tokens give a
//!    fresh, empty session
//! 2. handler reads/mutates the handle
//! 3. `commit` - delete rotated-away tokens, then save (returns `Set-Cookie`)
//!    or destroy (returns an expiring `Set-Cookie`); untouched sessions emit
//!    nothing

use std::sync::Arc;

use chrono::Utc;
use platform::cookie::CookieConfig;
use platform::crypto::random_token;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::application::config::AuthConfig;
use crate::domain::entity::session::{SessionData, SessionRecord, USER_ID_KEY};
use crate::domain::repository::SessionStore;
use crate::domain::value_object::user_id::UserId;
use crate::error::AuthResult;

/// What `commit` has to do with a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Unmodified,
    Modified,
    Destroyed,
}

struct SessionState {
    token: Option<String>,
    data: SessionData,
    expires_at_ms: i64,
    status: SessionStatus,
    /// Tokens to delete from the store on commit
    stale_tokens: Vec<String>,
}

/// Request-scoped session handle
///
/// Clones share state; the middleware keeps one clone to commit after the
/// handler has run with another.
#[derive(Clone)]
pub struct Session {
    state: Arc<Mutex<SessionState>>,
    ttl_ms: i64,
}

impl Session {
    fn new(state: SessionState, ttl_ms: i64) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            ttl_ms,
        }
    }

    fn fresh(ttl_ms: i64) -> Self {
        Self::new(
            SessionState {
                token: None,
                data: SessionData::new(),
                expires_at_ms: Utc::now().timestamp_millis() + ttl_ms,
                status: SessionStatus::Unmodified,
                stale_tokens: Vec::new(),
            },
            ttl_ms,
        )
    }

    fn loaded(record: SessionRecord, ttl_ms: i64) -> Self {
        Self::new(
            SessionState {
                token: Some(record.token),
                data: record.data,
                expires_at_ms: record.expires_at_ms,
                status: SessionStatus::Unmodified,
                stale_tokens: Vec::new(),
            },
            ttl_ms,
        )
    }

    /// Current token (`None` until first commit)
    pub async fn token(&self) -> Option<String> {
        self.state.lock().await.token.clone()
    }

    pub async fn status(&self) -> SessionStatus {
        self.state.lock().await.status
    }

    /// Read an attribute, `None` if absent or of another type
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let state = self.state.lock().await;
        state
            .data
            .get(key)
            .cloned()
            .and_then(|value| serde_json::from_value(value).ok())
    }

    /// Set an attribute
    pub async fn insert(&self, key: impl Into<String>, value: impl Into<Value>) {
        let mut state = self.state.lock().await;
        if state.status == SessionStatus::Destroyed {
            // Writing after destroy starts a new session
            state.expires_at_ms = Utc::now().timestamp_millis() + self.ttl_ms;
        }
        state.data.insert(key.into(), value.into());
        state.status = SessionStatus::Modified;
    }

    /// Authenticated user, [`UserId::UNASSIGNED`] when there is none
    pub async fn user_id(&self) -> UserId {
        self.get::<i64>(USER_ID_KEY)
            .await
            .map(UserId::from_raw)
            .unwrap_or_default()
    }

    pub async fn set_user_id(&self, id: UserId) {
        self.insert(USER_ID_KEY, id.value()).await;
    }

    /// Rotate the token and restart the lifetime
    ///
    /// Attributes carry over to the new token; the old one is deleted on
    /// commit.
    pub async fn renew_token(&self) {
        let mut state = self.state.lock().await;
        if let Some(old) = state.token.take() {
            state.stale_tokens.push(old);
        }
        state.token = Some(random_token());
        state.expires_at_ms = Utc::now().timestamp_millis() + self.ttl_ms;
        state.status = SessionStatus::Modified;
    }

    /// Drop all attributes and delete the session on commit
    pub async fn destroy(&self) {
        let mut state = self.state.lock().await;
        if let Some(old) = state.token.take() {
            state.stale_tokens.push(old);
        }
        state.data.clear();
        state.status = SessionStatus::Destroyed;
    }
}

/// Session manager
pub struct SessionManager<S> {
    store: Arc<S>,
    cookie: CookieConfig,
    ttl_ms: i64,
}

impl<S> Clone for SessionManager<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            cookie: self.cookie.clone(),
            ttl_ms: self.ttl_ms,
        }
    }
}

impl<S> SessionManager<S>
where
    S: SessionStore,
{
    pub fn new(store: Arc<S>, config: &AuthConfig) -> Self {
        Self {
            store,
            cookie: config.cookie_config(),
            ttl_ms: config.session_ttl_ms(),
        }
    }

    /// Name of the cookie carrying the token
    pub fn cookie_name(&self) -> &str {
        &self.cookie.name
    }

    /// Load the session for a request cookie value
    pub async fn load(&self, token: Option<&str>) -> AuthResult<Session> {
        let Some(token) = token else {
            return Ok(Session::fresh(self.ttl_ms));
        };

        match self.store.find(token).await? {
            Some(record) => {
                tracing::debug!("Session loaded");
                Ok(Session::loaded(record, self.ttl_ms))
            }
            None => {
                tracing::debug!("Unknown or expired session token, starting fresh session");
                Ok(Session::fresh(self.ttl_ms))
            }
        }
    }

    /// Persist session changes
    ///
    /// Returns the `Set-Cookie` value to send, if any.
    pub async fn commit(&self, session: &Session) -> AuthResult<Option<String>> {
        let mut state = session.state.lock().await;

        for stale in std::mem::take(&mut state.stale_tokens) {
            self.store.delete(&stale).await?;
        }

        match state.status {
            SessionStatus::Unmodified => Ok(None),
            SessionStatus::Destroyed => {
                state.status = SessionStatus::Unmodified;
                tracing::debug!("Session destroyed");
                Ok(Some(self.cookie.build_delete_cookie()))
            }
            SessionStatus::Modified => {
                let token = state.token.get_or_insert_with(random_token).clone();
                let record =
                    SessionRecord::new(token.clone(), state.data.clone(), state.expires_at_ms);
                self.store.commit(&record).await?;
                state.status = SessionStatus::Unmodified;

                let max_age_secs = (record.expires_at_ms - Utc::now().timestamp_millis()) / 1000;
                tracing::debug!(max_age_secs, "Session committed");

                Ok(Some(self.cookie.build_set_cookie(&token, Some(max_age_secs))))
            }
        }
    }
}
