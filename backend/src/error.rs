//! Application error handling
//!
//! Converts internal errors to HTTP responses. Authentication failures are
//! 401 with their specific code. Authorization failures are 403 and, unless
//! `auth.expose_deny_reasons` is set, share one generic body so a caller
//! cannot tell "not yours" from "does not exist".

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use classroom_shared::{AuthError, AuthErrorClass, ErrorDetail, ErrorResponse};
use thiserror::Error;
use tracing::error;

/// API error type that can be converted to HTTP responses
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<&'static str>,
    },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(AuthError),

    #[error("Forbidden: {reason}")]
    Forbidden { reason: AuthError, expose: bool },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Dependency unavailable")]
    DependencyUnavailable,

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("Database error")]
    Database(#[from] sqlx::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            field: Some(field),
        }
    }

    /// Render a denial; authorization reasons are hidden unless `expose`
    pub fn from_denial(reason: AuthError, expose: bool) -> Self {
        match reason.class() {
            AuthErrorClass::Authorization => ApiError::Forbidden { reason, expose },
            _ => reason.into(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(kind: AuthError) -> Self {
        match kind.class() {
            AuthErrorClass::Authentication => ApiError::Unauthenticated(kind),
            AuthErrorClass::Authorization => ApiError::Forbidden {
                reason: kind,
                expose: false,
            },
            AuthErrorClass::Dependency => ApiError::DependencyUnavailable,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut field = None;
        let (status, code, message) = match &self {
            ApiError::Validation { message, field: f } => {
                field = f.map(str::to_string);
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message.clone())
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            ApiError::Unauthenticated(kind) => {
                (StatusCode::UNAUTHORIZED, kind.code(), kind.to_string())
            }
            ApiError::Forbidden { reason, expose: true } => {
                (StatusCode::FORBIDDEN, reason.code(), reason.to_string())
            }
            ApiError::Forbidden { expose: false, .. } => {
                (StatusCode::FORBIDDEN, "FORBIDDEN", "Forbidden".to_string())
            }
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            ApiError::DependencyUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                AuthError::DependencyUnavailable.code(),
                "Service temporarily unavailable".to_string(),
            ),
            ApiError::Internal(err) => {
                error!("Internal error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
            ApiError::Database(err) => {
                error!("Database error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                field,
            },
        });

        (status, body).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use rstest::rstest;

    async fn body_of(error: ApiError) -> (StatusCode, ErrorResponse) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_validation_error_status() {
        let response = ApiError::validation("email", "Invalid email").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_not_found_error_status() {
        let response = ApiError::NotFound("Classroom code not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[rstest]
    #[case(AuthError::MissingCredential, StatusCode::UNAUTHORIZED)]
    #[case(AuthError::InvalidCredentials, StatusCode::UNAUTHORIZED)]
    #[case(AuthError::MalformedToken, StatusCode::UNAUTHORIZED)]
    #[case(AuthError::ExpiredToken, StatusCode::UNAUTHORIZED)]
    #[case(AuthError::RevokedToken, StatusCode::UNAUTHORIZED)]
    #[case(AuthError::UnknownSubject, StatusCode::UNAUTHORIZED)]
    #[case(AuthError::WrongRole, StatusCode::FORBIDDEN)]
    #[case(AuthError::NotOwner, StatusCode::FORBIDDEN)]
    #[case(AuthError::NotMember, StatusCode::FORBIDDEN)]
    #[case(AuthError::UnknownResource, StatusCode::FORBIDDEN)]
    #[case(AuthError::PastDeadline, StatusCode::FORBIDDEN)]
    #[case(AuthError::DependencyUnavailable, StatusCode::SERVICE_UNAVAILABLE)]
    fn test_auth_error_status(#[case] kind: AuthError, #[case] status: StatusCode) {
        assert_eq!(ApiError::from(kind).into_response().status(), status);
    }

    #[tokio::test]
    async fn test_authentication_failures_carry_their_code() {
        let (status, body) = body_of(AuthError::RevokedToken.into()).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body.error.code, "REVOKED_TOKEN");
    }

    #[tokio::test]
    async fn test_denials_are_indistinguishable_by_default() {
        let (_, not_owner) = body_of(ApiError::from_denial(AuthError::NotOwner, false)).await;
        let (_, unknown) = body_of(ApiError::from_denial(AuthError::UnknownResource, false)).await;

        assert_eq!(not_owner.error.code, "FORBIDDEN");
        assert_eq!(not_owner.error.code, unknown.error.code);
        assert_eq!(not_owner.error.message, unknown.error.message);
    }

    #[tokio::test]
    async fn test_denial_reason_exposed_when_configured() {
        let (status, body) = body_of(ApiError::from_denial(AuthError::PastDeadline, true)).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body.error.code, "PAST_DEADLINE");
    }

    #[tokio::test]
    async fn test_unauthenticated_denial_is_401() {
        let (status, body) = body_of(ApiError::from_denial(AuthError::MissingCredential, true)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body.error.code, "MISSING_CREDENTIAL");
    }

    #[tokio::test]
    async fn test_validation_field_is_reported() {
        let (_, body) = body_of(ApiError::validation("password", "Too short")).await;

        assert_eq!(body.error.field.as_deref(), Some("password"));
    }
}
