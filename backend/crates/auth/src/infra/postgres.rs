//! PostgreSQL Repository Implementations

use chrono::Utc;
use kernel::error::conversions::is_unique_violation;
use platform::password::HashedPassword;
use sqlx::PgPool;
use sqlx::types::Json;

use crate::domain::entity::{
    session::{SessionData, SessionRecord},
    user::User,
};
use crate::domain::repository::{SessionStore, UserRepository};
use crate::domain::value_object::{email::Email, user_id::UserId};
use crate::error::{AuthError, AuthResult};

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAuthRepository {
    async fn create(&self, user: &mut User) -> AuthResult<()> {
        user.prepare_for_create()?;

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (email, encrypted_password)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(&user.email)
        .bind(user.stored_hash()?.as_phc_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AuthError::DuplicateEmail
            } else {
                AuthError::Database(e)
            }
        })?;

        user.id = UserId::from_raw(id);

        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> AuthResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                id,
                email,
                encrypted_password
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(Email::normalize(email))
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(AuthError::RecordNotFound)?.into_user()
    }

    async fn find(&self, id: UserId) -> AuthResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                id,
                email,
                encrypted_password
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(AuthError::RecordNotFound)?.into_user()
    }
}

// ============================================================================
// Session Store Implementation
// ============================================================================

impl SessionStore for PgAuthRepository {
    async fn find(&self, token: &str) -> AuthResult<Option<SessionRecord>> {
        let now_ms = Utc::now().timestamp_millis();

        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT
                token,
                data,
                expires_at_ms
            FROM auth_sessions
            WHERE token = $1 AND expires_at_ms > $2
            "#,
        )
        .bind(token)
        .bind(now_ms)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SessionRow::into_record))
    }

    async fn commit(&self, record: &SessionRecord) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO auth_sessions (token, data, expires_at_ms)
            VALUES ($1, $2, $3)
            ON CONFLICT (token) DO UPDATE SET
                data = EXCLUDED.data,
                expires_at_ms = EXCLUDED.expires_at_ms
            "#,
        )
        .bind(&record.token)
        .bind(Json(&record.data))
        .bind(record.expires_at_ms)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, token: &str) -> AuthResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let now_ms = Utc::now().timestamp_millis();

        let deleted = sqlx::query("DELETE FROM auth_sessions WHERE expires_at_ms <= $1")
            .bind(now_ms)
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(sessions_deleted = deleted, "Cleaned up expired auth sessions");

        Ok(deleted)
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    encrypted_password: String,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        let hash = HashedPassword::from_phc_string(self.encrypted_password)?;
        Ok(User::from_stored(UserId::from_raw(self.id), self.email, hash))
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    token: String,
    data: Json<SessionData>,
    expires_at_ms: i64,
}

impl SessionRow {
    fn into_record(self) -> SessionRecord {
        SessionRecord::new(self.token, self.data.0, self.expires_at_ms)
    }
}
