//! API error type and its mapping onto HTTP status codes.

use crate::store::StoreError;
use serde_json::{Value, json};
use thiserror::Error;

/// Failure of an API request.
///
/// The payload is the machine-readable code sent back as `{"error": code}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    MethodNotAllowed(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(code: impl Into<String>) -> Self {
        Self::BadRequest(code.into())
    }

    pub fn not_found(code: impl Into<String>) -> Self {
        Self::NotFound(code.into())
    }

    pub fn conflict(code: impl Into<String>) -> Self {
        Self::Conflict(code.into())
    }

    pub const fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::NotFound(_) => 404,
            Self::MethodNotAllowed(_) => 405,
            Self::Conflict(_) => 409,
            Self::Internal(_) => 500,
        }
    }

    pub fn to_json(&self) -> Value {
        json!({ "error": self.to_string() })
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidPath(_) => Self::bad_request("invalid_path"),
            StoreError::NotFound(_) => Self::not_found("not_found"),
            StoreError::Decode(_) | StoreError::Io(..) => Self::Internal(format!("{err:#}")),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::bad_request("x").status_code(), 400);
        assert_eq!(ApiError::not_found("file_not_found").status_code(), 404);
        assert_eq!(ApiError::conflict("exists").status_code(), 409);
        assert_eq!(ApiError::Internal("boom".into()).status_code(), 500);
    }

    #[test]
    fn test_from_store_error() {
        let err: ApiError = StoreError::InvalidPath("../x".into()).into();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.to_json(), json!({"error": "invalid_path"}));

        let err: ApiError = StoreError::Decode(PathBuf::from("a.md")).into();
        assert_eq!(err.status_code(), 500);
    }
}
