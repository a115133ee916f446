//! Error types.
//!
//! Two layers:
//!
//! - [`Error`] surfaces infrastructure failures: reading configuration,
//!   building the upstream client, binding the listener.
//! - [`ApiError`] is the per-request taxonomy. Every variant renders as a
//!   JSON object with a single `error` field and the matching status.

use serde::Serialize;

use crate::config::ConfigError;
use crate::response::{IntoResponse, Response};
use crate::status::Status;
use crate::upstream::UpstreamError;

/// The error type returned by waybill's startup and serving operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("upstream client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Request-level failure, rendered as `{"error": "..."}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Required input is missing or blank. 400.
    #[error("{0}")]
    BadRequest(String),

    /// An order resolved but the contact hint did not match. 403.
    ///
    /// Carries no order data so nothing can leak through the error path.
    #[error("Contact details do not match order")]
    Forbidden,

    /// No order resolved by any lookup path. 404.
    #[error("Order not found")]
    NotFound,

    /// Transport failure, non-2xx answer, or undecodable body upstream. 500.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// Anything uncategorized, such as a handler panic. 500.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> Status {
        match self {
            Self::BadRequest(_) => Status::BadRequest,
            Self::Forbidden => Status::Forbidden,
            Self::NotFound => Status::NotFound,
            Self::Upstream(_) | Self::Internal(_) => Status::InternalServerError,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

/// Builds the `{"error": message}` response every failure path shares.
pub(crate) fn error_response(status: Status, message: &str) -> Response {
    let body = serde_json::to_vec(&ErrorBody { error: message })
        .unwrap_or_else(|_| br#"{"error":"internal error"}"#.to_vec());
    Response::builder().status(status).json(body)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == Status::InternalServerError {
            tracing::error!(error = %self, "request failed");
        }
        error_response(status, &self.to_string())
    }
}
