use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::types::ApiErrorResponse;

/// Application error codes following the pattern E{area}{sequence}
///
/// Ranges:
/// - E0xxx: Shared/infrastructure errors
/// - E1xxx: Auth errors
/// - E2xxx: User and follow graph errors
/// - E3xxx: Post, comment and like errors
/// - E4xxx: Notification errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Shared (E0xxx)
    InternalError,
    ValidationError,
    NotFound,
    Unauthorized,
    Forbidden,

    // Auth (E1xxx)
    TokenExpired,
    TokenInvalid,
    WrongPassword,
    PasswordTooWeak,
    PasswordMismatch,

    // Users (E2xxx)
    UserNotFound,
    UsernameTaken,
    EmailTaken,
    InvalidUsername,
    FollowAlreadyExists,
    FollowNotFound,
    CannotFollowSelf,

    // Posts (E3xxx)
    PostNotFound,
    CommentNotFound,
    LikeAlreadyExists,
    LikeNotFound,
    NotAuthor,

    // Notifications (E4xxx)
    NotificationNotFound,
}

impl ErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            // Shared
            Self::InternalError => "E0001",
            Self::ValidationError => "E0002",
            Self::NotFound => "E0003",
            Self::Unauthorized => "E0004",
            Self::Forbidden => "E0005",

            // Auth
            Self::TokenExpired => "E1001",
            Self::TokenInvalid => "E1002",
            Self::WrongPassword => "E1003",
            Self::PasswordTooWeak => "E1004",
            Self::PasswordMismatch => "E1005",

            // Users
            Self::UserNotFound => "E2001",
            Self::UsernameTaken => "E2002",
            Self::EmailTaken => "E2003",
            Self::InvalidUsername => "E2004",
            Self::FollowAlreadyExists => "E2005",
            Self::FollowNotFound => "E2006",
            Self::CannotFollowSelf => "E2007",

            // Posts
            Self::PostNotFound => "E3001",
            Self::CommentNotFound => "E3002",
            Self::LikeAlreadyExists => "E3003",
            Self::LikeNotFound => "E3004",
            Self::NotAuthor => "E3005",

            // Notifications
            Self::NotificationNotFound => "E4001",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ValidationError | Self::PasswordTooWeak
            | Self::PasswordMismatch | Self::WrongPassword | Self::InvalidUsername
            | Self::UsernameTaken | Self::EmailTaken => StatusCode::BAD_REQUEST,
            // Duplicate edges and self-follows are invalid operations, not conflicts
            Self::FollowAlreadyExists | Self::LikeAlreadyExists
            | Self::CannotFollowSelf => StatusCode::BAD_REQUEST,
            Self::NotFound | Self::UserNotFound | Self::FollowNotFound
            | Self::PostNotFound | Self::CommentNotFound | Self::LikeNotFound
            | Self::NotificationNotFound => StatusCode::NOT_FOUND,
            Self::Unauthorized | Self::TokenExpired | Self::TokenInvalid => StatusCode::UNAUTHORIZED,
            Self::Forbidden | Self::NotAuthor => StatusCode::FORBIDDEN,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Known {
        code: ErrorCode,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// The error code a client would see for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Known { code, .. } => *code,
            AppError::Internal(_) => ErrorCode::InternalError,
            AppError::Database(diesel::result::Error::NotFound) => ErrorCode::NotFound,
            AppError::Database(_) => ErrorCode::InternalError,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            AppError::Known { code, message, details } => {
                let status = code.status_code();
                let mut resp = ApiErrorResponse::new(code.code(), message);
                if let Some(d) = details {
                    resp = resp.with_details(d.clone());
                }
                (status, resp)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorResponse::new("E0001", "internal server error"),
                )
            }
            AppError::Database(err) => {
                tracing::error!(error = %err, "database error");
                match err {
                    diesel::result::Error::NotFound => (
                        StatusCode::NOT_FOUND,
                        ApiErrorResponse::new("E0003", "resource not found"),
                    ),
                    _ => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ApiErrorResponse::new("E0001", "database error"),
                    ),
                }
            }
        };

        (status, Json(error_response)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[test]
    fn taxonomy_maps_to_expected_statuses() {
        assert_eq!(ErrorCode::FollowNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::NotAuthor.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::TokenExpired.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::CannotFollowSelf.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::LikeAlreadyExists.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::FollowAlreadyExists.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn known_error_renders_envelope() {
        let response = AppError::new(ErrorCode::PostNotFound, "post not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(
            body,
            serde_json::json!({
                "success": false,
                "error": { "code": "E3001", "message": "post not found" }
            })
        );
    }

    #[tokio::test]
    async fn database_errors_hide_details() {
        let err = AppError::from(diesel::result::Error::RollbackTransaction);
        assert_eq!(err.code(), ErrorCode::InternalError);

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], "database error");
    }
}
