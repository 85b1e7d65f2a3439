//! Sign In Use Case
//!
//! Checks email/password credentials. Session handling is the caller's job.

use std::sync::Arc;

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::error::{AuthError, AuthResult};

/// Sign in input
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

/// Sign in use case
pub struct SignInUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
}

impl<R> SignInUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Unknown email and wrong password fail identically
    pub async fn execute(&self, input: SignInInput) -> AuthResult<User> {
        let user = match self.repo.find_by_email(&input.email).await {
            Ok(user) => user,
            Err(AuthError::RecordNotFound) => {
                tracing::debug!("Sign in for unknown email");
                return Err(AuthError::IncorrectEmailOrPassword);
            }
            Err(e) => return Err(e),
        };

        if !user.compare_password(&input.password) {
            tracing::debug!(user_id = %user.id, "Sign in with wrong password");
            return Err(AuthError::IncorrectEmailOrPassword);
        }

        tracing::info!(user_id = %user.id, "User signed in");

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::memory::MemoryAuthRepository;

    async fn seeded() -> Arc<MemoryAuthRepository> {
        let repo = Arc::new(MemoryAuthRepository::new());
        let mut user = User::new("user@example.org", "password");
        repo.create(&mut user).await.unwrap();
        repo
    }

    fn input(email: &str, password: &str) -> SignInInput {
        SignInInput {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_sign_in_success() {
        let use_case = SignInUseCase::new(seeded().await);
        let user = use_case
            .execute(input("USER@example.org", "password"))
            .await
            .unwrap();
        assert_eq!(user.email, "user@example.org");
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_look_the_same() {
        let use_case = SignInUseCase::new(seeded().await);

        let wrong = use_case
            .execute(input("user@example.org", "wrong-password"))
            .await
            .unwrap_err();
        let unknown = use_case
            .execute(input("nobody@example.org", "password"))
            .await
            .unwrap_err();

        assert!(matches!(wrong, AuthError::IncorrectEmailOrPassword));
        assert!(matches!(unknown, AuthError::IncorrectEmailOrPassword));
        assert_eq!(wrong.to_string(), unknown.to_string());
    }
}
