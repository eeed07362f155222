use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use vellum_common::path::PathError;

use crate::store::content::ContentError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ValidationFailed,
    AuthInvalidToken,
    Forbidden,
    NotFound,
    PermissionDenied,
    InvalidEncoding,
    InternalError,
}

impl ErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::AuthInvalidToken => "AUTH_INVALID_TOKEN",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::InvalidEncoding => "INVALID_ENCODING",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    pub const fn status(self) -> StatusCode {
        match self {
            Self::ValidationFailed => StatusCode::BAD_REQUEST,
            Self::AuthInvalidToken => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::PermissionDenied => StatusCode::FORBIDDEN,
            Self::InvalidEncoding => StatusCode::BAD_REQUEST,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub const fn default_message(self) -> &'static str {
        match self {
            Self::ValidationFailed => "request validation failed",
            Self::AuthInvalidToken => "invalid authentication token",
            Self::Forbidden => "access outside the workspace root is not allowed",
            Self::NotFound => "requested file or directory not found",
            Self::PermissionDenied => "the server lacks filesystem permission for this operation",
            Self::InvalidEncoding => "file content is not valid UTF-8 text",
            Self::InternalError => "internal server error",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiError {
    code: ErrorCode,
    message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    pub fn from_code(code: ErrorCode) -> Self {
        Self::new(code, code.default_message())
    }

    pub fn internal(error: impl std::fmt::Display) -> Self {
        tracing::error!(error = %error, "internal api error");
        Self::from_code(ErrorCode::InternalError)
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.code.status(),
            Json(json!({
                "error": {
                    "code": self.code.as_str(),
                    "message": self.message,
                }
            })),
        )
            .into_response()
    }
}

impl From<PathError> for ApiError {
    fn from(error: PathError) -> Self {
        match error {
            PathError::Traversal(_) | PathError::OutsideRoot => {
                Self::from_code(ErrorCode::Forbidden)
            }
            other => Self::new(ErrorCode::ValidationFailed, other.to_string()),
        }
    }
}

impl From<ContentError> for ApiError {
    fn from(error: ContentError) -> Self {
        match error {
            ContentError::Path(path_error) => path_error.into(),
            ContentError::NotFound { path } => {
                Self::new(ErrorCode::NotFound, format!("file or directory does not exist: {path}"))
            }
            ContentError::PermissionDenied { path } => Self::new(
                ErrorCode::PermissionDenied,
                format!("permission denied: {path}"),
            ),
            ContentError::InvalidEncoding { path } => Self::new(
                ErrorCode::InvalidEncoding,
                format!("file is not valid UTF-8 text: {path}"),
            ),
            ContentError::InvalidYaml(diagnostic) => {
                Self::new(ErrorCode::ValidationFailed, diagnostic.to_string())
            }
            ContentError::Io(error) => Self::internal(error),
        }
    }
}
