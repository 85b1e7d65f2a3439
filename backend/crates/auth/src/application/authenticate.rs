//! Authenticate Use Case
//!
//! Resolves the user behind a session.

use std::sync::Arc;

use crate::application::session::Session;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::error::{AuthError, AuthResult};

/// Authenticate use case
pub struct AuthenticateUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
}

impl<R> AuthenticateUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// `NotAuthenticated` when the session has no user or the user is gone.
    /// Store failures propagate unchanged.
    pub async fn execute(&self, session: &Session) -> AuthResult<User> {
        let user_id = session.user_id().await;
        if !user_id.is_assigned() {
            return Err(AuthError::NotAuthenticated);
        }

        match self.repo.find(user_id).await {
            Ok(user) => Ok(user),
            Err(AuthError::RecordNotFound) => {
                tracing::warn!(user_id = %user_id, "Session references a missing user");
                Err(AuthError::NotAuthenticated)
            }
            Err(e) => Err(e),
        }
    }
}
