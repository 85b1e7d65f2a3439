//! Auth Router

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::application::config::AuthConfig;
use crate::application::session::SessionManager;
use crate::domain::repository::{SessionStore, UserRepository};
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{
    cors, load_and_save, log_response, make_request_span, require_auth, set_request_id,
};

/// Build the application router for any repository implementation
///
/// Every request, including unknown routes and wrong methods, passes
/// through the full middleware chain and fails with the JSON error body.
pub fn app_router<R>(repo: R, config: AuthConfig) -> Router
where
    R: UserRepository + SessionStore + Clone + Send + Sync + 'static,
{
    let repo = Arc::new(repo);
    let sessions = SessionManager::new(repo.clone(), &config);
    let state = AuthAppState { repo };

    let protected = Router::new()
        .route("/private/whoami", get(handlers::whoami))
        .route("/me", get(handlers::whoami))
        .route_layer(from_fn_with_state(state.clone(), require_auth::<R>));

    Router::new()
        .route("/users", post(handlers::create_user::<R>))
        .route(
            "/session",
            post(handlers::create_session::<R>).delete(handlers::destroy_session),
        )
        .route(
            "/sessions",
            post(handlers::create_session::<R>).delete(handlers::destroy_session),
        )
        .merge(protected)
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(from_fn(set_request_id))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(make_request_span)
                        .on_response(log_response),
                )
                .layer(from_fn(cors))
                .layer(from_fn_with_state(sessions, load_and_save::<R>)),
        )
}
