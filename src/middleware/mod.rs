//! Cross-cutting request handling applied around every route.
//!
//! - [`trace`]: one structured log event per request with method, path,
//!   status and latency.
//! - [`Cors`]: stamps `access-control-allow-origin` on every response so the
//!   storefront can call the tracking endpoints from the browser.

pub mod trace;

use crate::response::Response;

/// Allow-origin policy for browser callers.
#[derive(Clone, Debug)]
pub struct Cors {
    allow_origin: String,
}

impl Cors {
    /// `"*"` allows every origin; anything else is sent back verbatim.
    pub fn allow_origin(origin: impl Into<String>) -> Self {
        Self { allow_origin: origin.into() }
    }

    pub(crate) fn apply(&self, res: &mut Response) {
        res.set_default_header("access-control-allow-origin", &self.allow_origin);
        if self.allow_origin != "*" {
            res.set_default_header("vary", "origin");
        }
    }
}
