//! Maps workflow outcomes to HTTP responses.
//!
//! Callers only learn whether a precondition collection was empty (404) or
//! the operation failed (500). The cause of a failure is logged, never sent.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use finsync_core::Error;
use serde_json::json;

/// An error returned by a request handler.
#[derive(Debug)]
pub enum ApiError {
    /// A collection the step needs is empty.
    NotFound(&'static str),
    /// Anything else went wrong.
    ///
    /// `message` is the generic text sent to the client, `cause` is only logged.
    Failed {
        message: &'static str,
        cause: String,
    },
}

impl ApiError {
    /// A failure with the generic `message` shown to the client.
    pub fn failed(message: &'static str, cause: impl ToString) -> Self {
        Self::Failed {
            message,
            cause: cause.to_string(),
        }
    }

    /// Classify a core error: `NotFound` becomes a 404 with `not_found`,
    /// everything else a 500 with `failed`.
    pub fn from_core(error: Error, not_found: &'static str, failed: &'static str) -> Self {
        if error.is_not_found() {
            Self::NotFound(not_found)
        } else {
            Self::failed(failed, error)
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(error) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "success": false, "error": error })),
            )
                .into_response(),
            ApiError::Failed { message, cause } => {
                tracing::error!(%cause, "{}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "success": false, "message": message })),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let error = ApiError::from_core(Error::not_found("empty"), "Nothing here.", "Broken.");
        assert!(matches!(error, ApiError::NotFound("Nothing here.")));
        assert_eq!(error.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_other_errors_map_to_500() {
        let error = ApiError::from_core(Error::remote("boom"), "Nothing here.", "Broken.");
        match &error {
            ApiError::Failed { message, cause } => {
                assert_eq!(*message, "Broken.");
                assert!(cause.contains("boom"));
            }
            other => panic!("expected Failed, got {:?}", other),
        }
        assert_eq!(
            error.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
