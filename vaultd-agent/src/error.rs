//! HTTP-layer errors.
//!
//! Dispatch outcomes, including failures, are always answered with an
//! [`ActionResponse`](vaultd::ActionResponse). [`AgentError`] only covers
//! requests that never reached the dispatcher.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors that can occur before a request is dispatched.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// The body was not the expected JSON.
    #[error("invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),

    /// Tool-call `arguments` were a string that is not a JSON object.
    #[error("invalid tool arguments: {0}")]
    InvalidArguments(#[from] serde_json::Error),
}

impl IntoResponse for AgentError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidBody(rejection) => rejection.status(),
            Self::InvalidArguments(_) => StatusCode::BAD_REQUEST,
        };
        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
