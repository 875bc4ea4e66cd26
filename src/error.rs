//! Error types for Bookshelf server

use axum::{
    extract::rejection::JsonRejection,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Duration;
use thiserror::Error;

/// Server-owned or identity fields a caller tried to write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForbiddenField {
    Isbn,
    Timestamps,
}

impl std::fmt::Display for ForbiddenField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ForbiddenField::Isbn => f.write_str("Not allowed to change ISBN"),
            ForbiddenField::Timestamps => {
                f.write_str("Not allowed to change CreateTime or UpdateTime")
            }
        }
    }
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation failed, field error(s): {} . Fix these error before proceeding", .fields.join(", "))]
    Validation { fields: Vec<String> },

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    ForbiddenField(ForbiddenField),

    #[error("Updated a few seconds ago, please wait a moment before updating again")]
    Cooldown { remaining: Duration },

    #[error("Storage unavailable: {0}")]
    Storage(String),

    #[error("{0}")]
    BadRequest(String),
}

impl AppError {
    /// Whether this is an infrastructure failure rather than a business rule rejection
    #[cfg(test)]
    pub fn is_storage(&self) -> bool {
        matches!(self, AppError::Storage(_))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Storage(e.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// 425 Too Early
fn too_early() -> StatusCode {
    StatusCode::from_u16(425).unwrap_or(StatusCode::TOO_MANY_REQUESTS)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation { .. } => StatusCode::NOT_ACCEPTABLE,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ForbiddenField(_) => StatusCode::FORBIDDEN,
            AppError::Cooldown { .. } => too_early(),
            AppError::Storage(cause) => {
                tracing::error!("Storage error: {}", cause);
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        let message = match &self {
            AppError::Storage(_) => "Storage unavailable".to_string(),
            other => other.to_string(),
        };

        let mut response = (
            status,
            [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
            message,
        )
            .into_response();

        if let AppError::Cooldown { remaining } = self {
            // Whole seconds, rounded up
            let millis = remaining.num_milliseconds().max(0);
            let secs = (millis + 999) / 1000;
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = AppError::Validation { fields: vec!["isbn".to_string()] };
        assert_eq!(
            err.to_string(),
            "validation failed, field error(s): isbn . Fix these error before proceeding"
        );
        assert_eq!(
            AppError::ForbiddenField(ForbiddenField::Isbn).to_string(),
            "Not allowed to change ISBN"
        );
        assert_eq!(
            AppError::ForbiddenField(ForbiddenField::Timestamps).to_string(),
            "Not allowed to change CreateTime or UpdateTime"
        );
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::Validation { fields: vec![] }, 406),
            (AppError::Conflict("dup".into()), 409),
            (AppError::NotFound("gone".into()), 404),
            (AppError::ForbiddenField(ForbiddenField::Isbn), 403),
            (AppError::Cooldown { remaining: Duration::seconds(3) }, 425),
            (AppError::Storage("connection reset".into()), 503),
            (AppError::BadRequest("bad json".into()), 400),
        ];
        for (err, expected) in cases {
            let response = err.into_response();
            assert_eq!(response.status().as_u16(), expected);
            assert_eq!(
                response.headers().get(header::CONTENT_TYPE).unwrap(),
                "application/json"
            );
        }
    }

    #[test]
    fn test_cooldown_retry_after_rounds_up() {
        let response = AppError::Cooldown { remaining: Duration::milliseconds(2_100) }.into_response();
        assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "3");
    }

    #[tokio::test]
    async fn test_storage_cause_is_not_exposed() {
        let err = AppError::Storage("relation \"books\" does not exist".into());
        assert!(err.is_storage());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Storage unavailable");
    }
}
