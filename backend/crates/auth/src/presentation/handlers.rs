//! HTTP Handlers

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use kernel::error::app_error::AppError;
use std::sync::Arc;

use crate::application::session::Session;
use crate::application::{CreateUserInput, CreateUserUseCase, SignInInput, SignInUseCase};
use crate::domain::repository::{SessionStore, UserRepository};
use crate::error::AuthResult;
use crate::presentation::dto::{CreateUserRequest, SessionRequest, UserResponse};
use crate::presentation::extract::{CurrentUser, JsonBody};

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<R>
where
    R: UserRepository + SessionStore + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
}

// ============================================================================
// Users
// ============================================================================

/// POST /users
pub async fn create_user<R>(
    State(state): State<AuthAppState<R>>,
    JsonBody(req): JsonBody<CreateUserRequest>,
) -> AuthResult<(StatusCode, Json<UserResponse>)>
where
    R: UserRepository + SessionStore + Clone + Send + Sync + 'static,
{
    let use_case = CreateUserUseCase::new(state.repo.clone());

    let user = use_case
        .execute(CreateUserInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

// ============================================================================
// Sessions
// ============================================================================

/// POST /session
///
/// Rotates the session token before storing the user, so a token planted
/// before login is never promoted.
pub async fn create_session<R>(
    State(state): State<AuthAppState<R>>,
    session: Session,
    JsonBody(req): JsonBody<SessionRequest>,
) -> AuthResult<StatusCode>
where
    R: UserRepository + SessionStore + Clone + Send + Sync + 'static,
{
    let use_case = SignInUseCase::new(state.repo.clone());

    let user = use_case
        .execute(SignInInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    session.renew_token().await;
    session.set_user_id(user.id).await;

    Ok(StatusCode::OK)
}

/// DELETE /session
pub async fn destroy_session(session: Session) -> StatusCode {
    let user_id = session.user_id().await;
    session.destroy().await;

    if user_id.is_assigned() {
        tracing::info!(user_id = %user_id, "User signed out");
    }

    StatusCode::NO_CONTENT
}

// ============================================================================
// Protected
// ============================================================================

/// GET /private/whoami, GET /me
pub async fn whoami(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from(user.as_ref()))
}

// ============================================================================
// Fallback
// ============================================================================

/// Unknown route
pub async fn not_found() -> AppError {
    AppError::not_found("not found")
}

/// Known route, wrong method
pub async fn method_not_allowed() -> AppError {
    AppError::method_not_allowed("method not allowed")
}
