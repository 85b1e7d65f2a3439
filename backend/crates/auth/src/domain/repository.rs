//! Repository Traits
//!
//! Interfaces for data persistence. Implementations are in the infrastructure
//! layer; handlers and use cases only see these traits.

use crate::domain::entity::{session::SessionRecord, user::User};
use crate::domain::value_object::user_id::UserId;
use crate::error::AuthResult;

/// User repository trait
///
/// Every implementation classifies failures the same way: a rejected user
/// is `Validation`, a taken email is `DuplicateEmail`, a miss is
/// `RecordNotFound`.
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Validate, hash and persist a user, then backfill its ID
    async fn create(&self, user: &mut User) -> AuthResult<()>;

    /// Find user by email (normalised before lookup)
    async fn find_by_email(&self, email: &str) -> AuthResult<User>;

    /// Find user by ID
    async fn find(&self, id: UserId) -> AuthResult<User>;
}

/// Session store trait
#[trait_variant::make(SessionStore: Send)]
pub trait LocalSessionStore {
    /// Load a session; expired sessions are treated as absent
    async fn find(&self, token: &str) -> AuthResult<Option<SessionRecord>>;

    /// Insert or replace a session
    async fn commit(&self, record: &SessionRecord) -> AuthResult<()>;

    /// Delete a session (no-op when absent)
    async fn delete(&self, token: &str) -> AuthResult<()>;

    /// Remove expired sessions, returning how many were deleted
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}
