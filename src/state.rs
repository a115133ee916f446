//! Shared, read-only application state handed to every route.

use std::sync::Arc;

use crate::config::Config;
use crate::resolver::{Resolver, ResolverConfig};
use crate::upstream::OrderSource;

pub struct AppState {
    pub source: Arc<dyn OrderSource>,
    pub resolver: Resolver,
    /// Page size for the `/orders` preview.
    pub orders_preview_limit: u32,
    /// Order fetched by `/test-order`.
    pub diagnostic_order_id: String,
    /// Shop and token are configured; drives `/readyz`.
    pub upstream_configured: bool,
}

impl AppState {
    pub fn new(source: Arc<dyn OrderSource>, config: &Config) -> Self {
        Self {
            resolver: Resolver::new(Arc::clone(&source), config.resolver),
            source,
            orders_preview_limit: config.orders_preview_limit,
            diagnostic_order_id: config.diagnostic_order_id.clone(),
            upstream_configured: config.shopify.is_complete(),
        }
    }

    /// State with default settings around `source`, treated as configured.
    pub fn with_source(source: Arc<dyn OrderSource>) -> Self {
        Self {
            resolver: Resolver::new(Arc::clone(&source), ResolverConfig::default()),
            source,
            orders_preview_limit: 5,
            diagnostic_order_id: "6365486809282".into(),
            upstream_configured: true,
        }
    }
}
