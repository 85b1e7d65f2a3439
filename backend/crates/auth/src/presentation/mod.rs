//! Presentation Layer
//!
//! HTTP handlers, DTOs, extractors, router, and middleware.

pub mod dto;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use extract::{CurrentUser, JsonBody};
pub use handlers::AuthAppState;
pub use middleware::{RequestId, X_REQUEST_ID};
pub use router::app_router;
