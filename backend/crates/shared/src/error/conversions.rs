//! Error conversions
//!
//! SQLSTATE helpers store implementations use, and the axum response
//! conversion for `AppError`.

#[cfg(feature = "axum")]
use super::app_error::AppError;
#[cfg(feature = "sqlx")]
use super::kind::ErrorKind;

// ============================================================================
// SQLx conversions (feature-gated)
// ============================================================================

/// PostgreSQL unique_violation
#[cfg(feature = "sqlx")]
const UNIQUE_VIOLATION: &str = "23505";

/// 一意制約違反（SQLSTATE 23505）かどうかを判定
///
/// ストア実装は重複キーをこの関数で検出し、ドメインエラーに変換します。
#[cfg(feature = "sqlx")]
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err
            .code()
            .is_some_and(|code| code.as_ref() == UNIQUE_VIOLATION),
        _ => false,
    }
}

/// `sqlx::Error` をエラー種別に分類
///
/// 接続系の障害は 503、それ以外はすべて 500 です。
/// `RowNotFound` は呼び出し側で `fetch_optional` により処理される前提なので、
/// ここでは特別扱いしません。
#[cfg(feature = "sqlx")]
pub fn classify_sqlx(err: &sqlx::Error) -> ErrorKind {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            ErrorKind::ServiceUnavailable
        }
        sqlx::Error::Database(db_err) => match db_err.code() {
            // Class 53: Insufficient Resources, Class 57: Operator Intervention
            Some(code) if code.starts_with("53") || code.starts_with("57") => {
                ErrorKind::ServiceUnavailable
            }
            _ => ErrorKind::InternalServerError,
        },
        _ => ErrorKind::InternalServerError,
    }
}

// ============================================================================
// Axum conversions (feature-gated)
// ============================================================================

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::kind::ErrorKind;

    #[cfg(feature = "sqlx")]
    #[test]
    fn test_sqlx_pool_timeout_is_unavailable() {
        let err = sqlx::Error::PoolTimedOut;
        assert!(!is_unique_violation(&err));
        assert_eq!(classify_sqlx(&err), ErrorKind::ServiceUnavailable);
    }

    #[cfg(feature = "sqlx")]
    #[test]
    fn test_sqlx_row_not_found_is_internal() {
        let err = sqlx::Error::RowNotFound;
        assert_eq!(classify_sqlx(&err), ErrorKind::InternalServerError);
    }

    #[cfg(feature = "axum")]
    #[test]
    fn test_into_response_status() {
        use axum::response::IntoResponse;

        let response = AppError::new(ErrorKind::Unauthorized, "not authenticated").into_response();
        assert_eq!(response.status(), axum::http::StatusCode::UNAUTHORIZED);

        let response = AppError::method_not_allowed("method not allowed").into_response();
        assert_eq!(response.status(), axum::http::StatusCode::METHOD_NOT_ALLOWED);
    }
}
