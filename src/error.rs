use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Semantic violation in a request body, reported with the offending field.
    #[error("Validation error: {msg}")]
    Validation { loc: Vec<String>, msg: String },

    /// Invalid request content, e.g. a reference to a missing entity.
    #[error("Invalid request: {msg}")]
    Invalid { loc: Vec<String>, msg: String },

    #[error("Not found: {msg}")]
    NotFound { loc: Vec<String>, msg: String },

    #[error("Bad request: {0}")]
    BadRequest(anyhow::Error),

    #[error("Conflict: {0}")]
    Conflict(anyhow::Error),

    #[error("Database error: {0}")]
    DatabaseError(anyhow::Error),

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

impl AppError {
    pub fn validation(loc: &[&str], msg: impl Into<String>) -> Self {
        AppError::Validation {
            loc: loc.iter().map(|s| s.to_string()).collect(),
            msg: msg.into(),
        }
    }

    pub fn invalid(loc: &[&str], msg: impl Into<String>) -> Self {
        AppError::Invalid {
            loc: loc.iter().map(|s| s.to_string()).collect(),
            msg: msg.into(),
        }
    }

    pub fn not_found(loc: &[&str], msg: impl Into<String>) -> Self {
        AppError::NotFound {
            loc: loc.iter().map(|s| s.to_string()).collect(),
            msg: msg.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest(anyhow::anyhow!(msg.into()))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation {
            loc: vec!["body".to_string()],
            msg: err.to_string(),
        }
    }
}

/// Single entry of the `detail` array emitted for request-level errors.
#[derive(Serialize)]
struct DetailItem {
    loc: Vec<String>,
    msg: String,
    #[serde(rename = "type")]
    kind: &'static str,
}

fn detail_response(status: StatusCode, loc: Vec<String>, msg: String) -> Response {
    (
        status,
        Json(serde_json::json!({
            "detail": [DetailItem { loc, msg, kind: "value_error" }]
        })),
    )
        .into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            details: Option<String>,
        }

        let (status, error_message, details) = match self {
            AppError::Validation { loc, msg } => {
                return detail_response(StatusCode::UNPROCESSABLE_ENTITY, loc, msg);
            }
            AppError::Invalid { loc, msg } => {
                return detail_response(StatusCode::BAD_REQUEST, loc, msg);
            }
            AppError::NotFound { loc, msg } => {
                return detail_response(StatusCode::NOT_FOUND, loc, msg);
            }
            AppError::BadRequest(err) => (StatusCode::BAD_REQUEST, err.to_string(), None),
            AppError::Conflict(err) => (StatusCode::CONFLICT, err.to_string(), None),
            AppError::DatabaseError(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error".to_string(),
                Some(err.to_string()),
            ),
            AppError::InternalError(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                Some(err.to_string()),
            ),
            AppError::ConfigError(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Configuration error".to_string(),
                Some(err.to_string()),
            ),
        };

        (
            status,
            Json(ErrorResponse {
                error: error_message,
                details,
            }),
        )
            .into_response()
    }
}
