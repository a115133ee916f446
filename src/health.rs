//! Liveness and readiness handlers.
//!
//! | Path | Answers |
//! |---|---|
//! | `/` | Human-readable banner, always 200. |
//! | `/healthz` | Process is up, always 200. |
//! | `/readyz` | 200 once Shopify credentials are configured, 503 before. |
//!
//! None of them call upstream: a Shopify outage must not get the pod
//! restarted or pulled from the load balancer.

use std::sync::Arc;

use crate::state::AppState;
use crate::{Request, Response, Status};

pub const BANNER: &str = "Shopify Tracking API is running!";

pub async fn banner(_req: Request) -> Response {
    Response::text(BANNER)
}

pub async fn liveness(_req: Request) -> Response {
    Response::text("ok")
}

pub async fn readiness(state: Arc<AppState>, _req: Request) -> Response {
    if state.upstream_configured {
        Response::text("ready")
    } else {
        Response::builder()
            .status(Status::ServiceUnavailable)
            .text("Shopify credentials missing")
    }
}
