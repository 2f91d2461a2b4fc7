//! Mapping crate errors onto API responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{debug, error};

use crate::error::Error;

#[derive(Debug, Serialize)]
pub(crate) struct ErrorBody {
    ok: bool,
    error: String,
}

/// An error returned by an API handler.
///
/// Every variant produces `{"ok": false, "error": "<message>"}`. Bad input
/// and a full contact list are `400`; anything else is `500`.
#[derive(Debug)]
pub struct ApiError(
    /// The underlying crate error.
    pub Error,
);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// The HTTP status this error maps to.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        } else {
            debug!("Request rejected: {}", self.0);
        }

        (
            status,
            Json(ErrorBody {
                ok: false,
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}
