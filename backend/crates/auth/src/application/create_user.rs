//! Create User Use Case
//!
//! Registers a new account.

use std::sync::Arc;

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::error::AuthResult;

/// Create user input
pub struct CreateUserInput {
    pub email: String,
    pub password: String,
}

/// Create user use case
pub struct CreateUserUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
}

impl<R> CreateUserUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Returns the stored user with the plaintext password cleared
    pub async fn execute(&self, input: CreateUserInput) -> AuthResult<User> {
        let mut user = User::new(input.email, input.password);

        self.repo.create(&mut user).await?;
        user.sanitize();

        tracing::info!(user_id = %user.id, "User created");

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthError;
    use crate::infra::memory::MemoryAuthRepository;

    fn input(email: &str, password: &str) -> CreateUserInput {
        CreateUserInput {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_returns_sanitized_user() {
        let use_case = CreateUserUseCase::new(Arc::new(MemoryAuthRepository::new()));

        let user = use_case
            .execute(input("user@example.org", "password"))
            .await
            .unwrap();

        assert!(user.id.is_assigned());
        assert!(user.password.is_none());
        assert!(user.compare_password("password"));
    }

    #[tokio::test]
    async fn test_validation_error() {
        let use_case = CreateUserUseCase::new(Arc::new(MemoryAuthRepository::new()));

        let err = use_case.execute(input("invalid", "")).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }
}
