//! Procedure error type and its HTTP mapping.

use axum::Json;
use axum::response::{IntoResponse, Response};
use haven_ai::AiError;
use haven_core::errors::CoreError;
use haven_db::error::DatabaseError;
use http::StatusCode;
use serde_json::json;
use thiserror::Error;

const GENERIC_INTERNAL: &str = "Something went wrong. Please try again later.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// LLM provider failure.
    #[error("Upstream error: {0}")]
    Upstream(#[from] AiError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Upstream(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Upstream(_) | Self::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Message safe to show a caller. Internal details stay in the logs.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Unauthorized(m)
            | Self::Forbidden(m)
            | Self::NotFound(m)
            | Self::BadRequest(m) => m.clone(),
            Self::Upstream(_) | Self::Internal(_) => GENERIC_INTERNAL.to_string(),
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NoResult => Self::NotFound("Resource not found.".into()),
            DatabaseError::AccessDenied(_) => Self::Forbidden("Access denied.".into()),
            DatabaseError::InvalidState(msg) => Self::BadRequest(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { entity_type, id } => {
                Self::NotFound(format!("{entity_type} {id} not found."))
            }
            CoreError::InvalidTransition { .. } | CoreError::Validation(_) => {
                Self::BadRequest(err.to_string())
            }
            CoreError::Other(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("serialization failed: {err}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "procedure failed");
        }
        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": self.public_message(),
            }
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn database_errors_map_by_kind() {
        assert!(matches!(
            ApiError::from(DatabaseError::NoResult),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from(DatabaseError::AccessDenied("x".into())),
            ApiError::Forbidden(_)
        ));
        assert!(matches!(
            ApiError::from(DatabaseError::InvalidState("bad".into())),
            ApiError::BadRequest(m) if m == "bad"
        ));
        assert!(matches!(
            ApiError::from(DatabaseError::Query("boom".into())),
            ApiError::Internal(_)
        ));
    }

    #[test]
    fn core_validation_is_bad_request() {
        let err = ApiError::from(CoreError::Validation("unknown modality 'x'".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn upstream_hides_details() {
        let err = ApiError::from(AiError::Api {
            status: 401,
            message: "invalid key sk-abc".into(),
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "INTERNAL_SERVER_ERROR");
        assert!(!err.public_message().contains("sk-abc"));
    }

    #[test]
    fn client_errors_keep_message() {
        let err = ApiError::Forbidden("Therapist access required.".into());
        assert_eq!(err.public_message(), "Therapist access required.");
        assert_eq!(err.code(), "FORBIDDEN");
    }
}
