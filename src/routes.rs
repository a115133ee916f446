//! Route table and the order endpoints.
//!
//! | Path | Answers |
//! |---|---|
//! | `GET /` | banner |
//! | `GET /healthz`, `GET /readyz` | health checks |
//! | `GET /orders` | raw upstream listing, small page |
//! | `GET /track-order?order_id=&email=` | [`TrackingSummary`](crate::order::TrackingSummary) |
//! | `GET /test-order` | raw upstream JSON for the diagnostic order |
//!
//! Every failure is a `{"error": "..."}` body; see [`ApiError`].

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;

use crate::error::ApiError;
use crate::health;
use crate::order::TrackingSummary;
use crate::response::Json;
use crate::state::AppState;
use crate::{Request, Router};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .get("/",            health::banner)
        .get("/healthz",     health::liveness)
        .get("/readyz",      with_state(Arc::clone(&state), health::readiness))
        .get("/orders",      with_state(Arc::clone(&state), list_orders))
        .get("/track-order", with_state(Arc::clone(&state), track_order))
        .get("/test-order",  with_state(Arc::clone(&state), test_order))
}

/// Adapts `f(state, req)` to the `Fn(Request)` shape the router stores.
fn with_state<F, Fut>(state: Arc<AppState>, f: F) -> impl Fn(Request) -> Fut + Send + Sync + 'static
where
    F: Fn(Arc<AppState>, Request) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
{
    move |req| f(Arc::clone(&state), req)
}

// GET /orders
async fn list_orders(state: Arc<AppState>, _req: Request) -> Result<Json<Value>, ApiError> {
    let page = state.source.list_recent_orders(state.orders_preview_limit).await?;
    Ok(Json(page))
}

// GET /track-order?order_id=#1001&email=jane@example.com
//
// `email` may hold a phone number instead.
async fn track_order(state: Arc<AppState>, req: Request) -> Result<Json<TrackingSummary>, ApiError> {
    let summary = state.resolver
        .track(req.query("order_id"), req.query("email"))
        .await?;
    Ok(Json(summary))
}

// GET /test-order
async fn test_order(state: Arc<AppState>, _req: Request) -> Result<Json<Value>, ApiError> {
    state.source
        .get_order_by_id(&state.diagnostic_order_id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::Method;
    use crate::mock::{Call, MockOrderSource};
    use crate::response::IntoResponse;

    fn state(source: MockOrderSource) -> (Arc<AppState>, Arc<MockOrderSource>) {
        let source = Arc::new(source);
        (Arc::new(AppState::with_source(source.clone())), source)
    }

    fn get(path: &str) -> Request {
        Request::synthetic(Method::Get, path)
    }

    #[tokio::test]
    async fn orders_passes_listing_through() {
        let (state, source) = state(MockOrderSource::new(vec![json!({ "id": 1, "name": "#1001", "note": "kept" })]));
        let res = list_orders(state, get("/orders")).await.into_response();
        assert_eq!(res.status_code(), 200);
        let body: Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(body, json!({ "orders": [{ "id": 1, "name": "#1001", "note": "kept" }] }));
        assert_eq!(source.calls(), vec![Call::ListRecent(5)]);
    }

    #[tokio::test]
    async fn test_order_fetches_diagnostic_id() {
        let (state, source) = state(MockOrderSource::new(vec![json!({ "id": 6365486809282u64, "name": "#1001" })]));
        let res = test_order(state, get("/test-order")).await.into_response();
        assert_eq!(res.status_code(), 200);
        assert_eq!(source.calls(), vec![Call::GetById("6365486809282".into())]);
    }

    #[tokio::test]
    async fn test_order_missing_is_404() {
        let (state, _) = state(MockOrderSource::default());
        let res = test_order(state, get("/test-order")).await.into_response();
        assert_eq!(res.status_code(), 404);
    }

    #[tokio::test]
    async fn track_order_reads_query() {
        let (state, _) = state(MockOrderSource::new(vec![json!({ "id": 1, "name": "#1001", "email": "jane@example.com" })]));
        let res = track_order(state, get("/track-order?order_id=%231001&email=Jane%40Example.com"))
            .await
            .into_response();
        assert_eq!(res.status_code(), 200);
        let body: Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(body["order_id"], "#1001");
    }
}
