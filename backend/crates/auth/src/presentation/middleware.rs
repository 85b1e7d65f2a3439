//! HTTP Middleware
//!
//! Applied outermost first: request id, access log, CORS, session
//! load/commit. `require_auth` is a route layer on protected routes only.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderName, HeaderValue, Method, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use platform::cookie::{extract_cookie, to_header_value};
use tracing::Span;
use uuid::Uuid;

use crate::application::AuthenticateUseCase;
use crate::application::session::{Session, SessionManager};
use crate::domain::repository::{SessionStore, UserRepository};
use crate::error::AuthError;
use crate::presentation::extract::CurrentUser;
use crate::presentation::handlers::AuthAppState;

/// Response header echoing the request id
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Per-request identifier, stored in request extensions
#[derive(Debug, Clone, Copy)]
pub struct RequestId(pub Uuid);

// ============================================================================
// Request ID
// ============================================================================

/// Assign a fresh UUID v4 to every request
pub async fn set_request_id(mut req: Request, next: Next) -> Response {
    let id = Uuid::new_v4();
    req.extensions_mut().insert(RequestId(id));

    let mut response = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&id.to_string()) {
        response.headers_mut().insert(X_REQUEST_ID, value);
    }
    response
}

// ============================================================================
// Access Log (TraceLayer hooks)
// ============================================================================

/// Span for one request: method, path, remote address, request id
pub fn make_request_span(req: &Request) -> Span {
    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.to_string())
        .unwrap_or_default();
    let remote_addr = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "-".to_string());

    tracing::info_span!(
        "request",
        method = %req.method(),
        path = %req.uri().path(),
        remote_addr = %remote_addr,
        request_id = %request_id,
    )
}

/// Completion event with status and latency
pub fn log_response(response: &Response, latency: Duration, _span: &Span) {
    tracing::info!(
        status = response.status().as_u16(),
        latency_ms = latency.as_millis() as u64,
        "request completed"
    );
}

// ============================================================================
// CORS
// ============================================================================

/// Permissive CORS headers on every response; preflights end here with 204
pub async fn cors(req: Request, next: Next) -> Response {
    let mut response = if req.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(req).await
    };

    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization"),
    );

    response
}

// ============================================================================
// Session
// ============================================================================

/// Load the session before the handler, commit it afterwards
pub async fn load_and_save<S>(
    State(manager): State<SessionManager<S>>,
    mut req: Request,
    next: Next,
) -> Response
where
    S: SessionStore + Send + Sync + 'static,
{
    let token = extract_cookie(req.headers(), manager.cookie_name());

    let session = match manager.load(token.as_deref()).await {
        Ok(session) => session,
        Err(e) => return e.into_response(),
    };
    req.extensions_mut().insert(session.clone());

    let mut response = next.run(req).await;

    match manager.commit(&session).await {
        Ok(Some(cookie)) => match to_header_value(&cookie) {
            Some(value) => {
                let headers = response.headers_mut();
                headers.append(header::SET_COOKIE, value);
                headers.append(header::VARY, HeaderValue::from_static("Cookie"));
                headers.insert(
                    header::CACHE_CONTROL,
                    HeaderValue::from_static(r#"no-cache="Set-Cookie""#),
                );
            }
            None => {
                return AuthError::Internal("session cookie is not a valid header".into())
                    .into_response();
            }
        },
        Ok(None) => {}
        Err(e) => return e.into_response(),
    }

    response
}

// ============================================================================
// Auth Gate
// ============================================================================

/// Reject requests without an authenticated session user
///
/// On success the resolved user is available to handlers as [`CurrentUser`].
pub async fn require_auth<R>(
    State(state): State<AuthAppState<R>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError>
where
    R: UserRepository + SessionStore + Clone + Send + Sync + 'static,
{
    let session = req
        .extensions()
        .get::<Session>()
        .cloned()
        .ok_or_else(|| AuthError::Internal("session middleware not installed".into()))?;

    let user = AuthenticateUseCase::new(state.repo.clone())
        .execute(&session)
        .await?;

    req.extensions_mut().insert(CurrentUser(Arc::new(user)));

    Ok(next.run(req).await)
}
