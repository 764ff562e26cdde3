use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;
use tracing::{error, warn};
use validator::ValidationErrors;

use crate::auth::{PasswordError, TokenError};
use crate::schemas::ErrorResponse;

/// Stable, machine-readable error codes. Clients match on these, never on the message.
pub mod error_code {
    pub const EMAIL_ALREADY_EXISTS: &str = "EMAIL_ALREADY_EXISTS";
    pub const USERNAME_ALREADY_EXISTS: &str = "USERNAME_ALREADY_EXISTS";
    pub const ALREADY_EXISTS: &str = "ALREADY_EXISTS";
    pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
    pub const UNAUTHENTICATED: &str = "UNAUTHENTICATED";
    pub const PERMISSION_DENIED: &str = "PERMISSION_DENIED";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
    pub const INTERNAL: &str = "INTERNAL";
}

/// Every failure a handler can surface to the client.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("User with the email already exists")]
    EmailTaken,

    #[error("User with the username already exists")]
    UsernameTaken,

    /// A unique constraint fired at insert time. HTTP 400.
    #[error("{0}")]
    Conflict(String),

    /// Input data is invalid. HTTP 400.
    #[error("{0}")]
    Validation(String),

    /// Missing, expired or malformed credentials. HTTP 401.
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated, but the role or order state forbids the action. HTTP 403.
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(DbErr),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::EmailTaken => error_code::EMAIL_ALREADY_EXISTS,
            ApiError::UsernameTaken => error_code::USERNAME_ALREADY_EXISTS,
            ApiError::Conflict(_) => error_code::ALREADY_EXISTS,
            ApiError::Validation(_) => error_code::VALIDATION_FAILED,
            ApiError::Unauthorized(_) => error_code::UNAUTHENTICATED,
            ApiError::Forbidden(_) => error_code::PERMISSION_DENIED,
            ApiError::NotFound(_) => error_code::NOT_FOUND,
            ApiError::Database(_) => error_code::DATABASE_ERROR,
            ApiError::Internal(_) => error_code::INTERNAL,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::EmailTaken
            | ApiError::UsernameTaken
            | ApiError::Conflict(_)
            | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DbErr> for ApiError {
    fn from(db_error: DbErr) -> Self {
        match db_error.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                ApiError::Conflict(format!("Record already exists: {}", detail))
            }
            _ => ApiError::Database(db_error),
        }
    }
}

// Minting a token or hashing a password only fails on misconfiguration
impl From<TokenError> for ApiError {
    fn from(token_error: TokenError) -> Self {
        ApiError::Internal(token_error.to_string())
    }
}

impl From<PasswordError> for ApiError {
    fn from(password_error: PasswordError) -> Self {
        ApiError::Internal(password_error.to_string())
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("{} is invalid", field),
                })
            })
            .collect();
        messages.sort();
        ApiError::Validation(messages.join("; "))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(code = self.error_code(), "Request failed: {}", self);
        } else {
            warn!(code = self.error_code(), status = status.as_u16(), "Request rejected: {}", self);
        }

        // Storage details stay in the log
        let message = match &self {
            ApiError::Database(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        let body = ErrorResponse {
            error: message,
            code: self.error_code().to_string(),
            success: false,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(length(max = 3, message = "name too long"))]
        name: String,
        #[validate(range(min = 1))]
        count: i32,
    }

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(ApiError::EmailTaken.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::UsernameTaken.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Conflict("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Unauthorized("x".into()).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden("x".into()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Database(DbErr::Custom("boom".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(ApiError::EmailTaken.error_code(), "EMAIL_ALREADY_EXISTS");
        assert_eq!(ApiError::Forbidden("x".into()).error_code(), "PERMISSION_DENIED");
        assert_eq!(ApiError::Unauthorized("x".into()).error_code(), "UNAUTHENTICATED");
    }

    #[test]
    fn test_validation_messages() {
        let probe = Probe {
            name: "toolong".to_string(),
            count: 0,
        };
        let error = ApiError::from(probe.validate().unwrap_err());

        match error {
            ApiError::Validation(message) => {
                assert!(message.contains("name too long"));
                assert!(message.contains("count is invalid"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_plain_db_error_is_not_conflict() {
        let error = ApiError::from(DbErr::Custom("connection reset".into()));
        assert!(matches!(error, ApiError::Database(_)));
    }
}
