//! Application Layer
//!
//! Use cases, the session manager and configuration.

pub mod authenticate;
pub mod config;
pub mod create_user;
pub mod session;
pub mod sign_in;

pub use authenticate::AuthenticateUseCase;
pub use create_user::{CreateUserInput, CreateUserUseCase};
pub use session::{Session, SessionManager, SessionStatus};
pub use sign_in::{SignInInput, SignInUseCase};
