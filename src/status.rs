//! HTTP status codes the service answers with, as a typed enum.
//!
//! Use [`Status`] anywhere a status code is accepted: `Response::status()`,
//! `Response::builder().status()`, or as a bare handler return value.
//!
//! ```rust
//! use waybill::{Response, Status};
//!
//! Response::status(Status::ServiceUnavailable);
//!
//! Response::builder()
//!     .status(Status::NotFound)
//!     .json(br#"{"error":"Order not found"}"#.to_vec());
//! ```

/// The subset of IANA status codes produced by the proxy and its health checks.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    // ── 2xx Success ───────────────────────────────────────────────────────────
    Ok,                  // 200

    // ── 4xx Client errors ─────────────────────────────────────────────────────
    BadRequest,          // 400
    Forbidden,           // 403
    NotFound,            // 404
    MethodNotAllowed,    // 405

    // ── 5xx Server errors ─────────────────────────────────────────────────────
    InternalServerError, // 500
    ServiceUnavailable,  // 503
}

impl Status {
    pub fn as_u16(self) -> u16 {
        match self {
            Self::Ok                  => 200,
            Self::BadRequest          => 400,
            Self::Forbidden           => 403,
            Self::NotFound            => 404,
            Self::MethodNotAllowed    => 405,
            Self::InternalServerError => 500,
            Self::ServiceUnavailable  => 503,
        }
    }
}

impl From<Status> for u16 {
    fn from(s: Status) -> u16 {
        s.as_u16()
    }
}

impl From<Status> for http::StatusCode {
    fn from(s: Status) -> http::StatusCode {
        // Every variant is a registered code, so the fallback is unreachable.
        http::StatusCode::from_u16(s.as_u16()).unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR)
    }
}
