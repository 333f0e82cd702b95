use axum::{
    extract::{multipart::MultipartError, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::errors::{FieldError, NavigationError};

/// Failure of a single request, rendered as `{"detail": ...}`
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Navigation(#[from] NavigationError),

    #[error("Malformed JSON body: {0}")]
    Json(#[from] JsonRejection),

    #[error("Malformed multipart body: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Missing multipart field `file`")]
    MissingFile,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::Navigation(err) => return navigation_response(err),
            ApiError::Json(rejection) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!([FieldError::new("body", rejection.body_text())]),
            ),
            ApiError::Multipart(err) => (err.status(), json!(err.body_text())),
            ApiError::MissingFile => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!([FieldError::new("file", "field required")]),
            ),
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

fn navigation_response(err: NavigationError) -> Response {
    let (status, detail) = match err {
        NavigationError::Validation(errors) => (StatusCode::UNPROCESSABLE_ENTITY, json!(errors)),
        NavigationError::NotFound(_) => (StatusCode::NOT_FOUND, json!(err.to_string())),
        NavigationError::Unauthorized => (StatusCode::UNAUTHORIZED, json!(err.to_string())),
        NavigationError::IoError(ref e) => {
            tracing::error!("I/O error: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, json!(err.to_string()))
        }
        err => {
            tracing::error!("Internal error: {:?}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!("Internal Server Error"),
            )
        }
    };

    (status, Json(json!({ "detail": detail }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (
                ApiError::from(NavigationError::invalid_field("name", "field required")),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ApiError::from(NavigationError::NotFound("Location")),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::from(NavigationError::Unauthorized),
                StatusCode::UNAUTHORIZED,
            ),
            (
                ApiError::from(NavigationError::IoError(std::io::Error::other("disk full"))),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (ApiError::MissingFile, StatusCode::UNPROCESSABLE_ENTITY),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }
}
