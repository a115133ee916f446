//! Client for the Shopify Admin REST API.
//!
//! [`OrderSource`] is the seam the resolver and routes depend on.
//! [`ShopifyClient`] implements it over HTTP with [`reqwest`];
//! [`MockOrderSource`](crate::mock::MockOrderSource) implements it in memory.
//!
//! Results are the upstream JSON documents as received, so diagnostic routes
//! can hand them back untouched. Decoding into typed orders happens in the
//! resolver.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;

use crate::config::ShopifyConfig;

/// Errors from the upstream API layer.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// Shop domain or access token is not configured.
    #[error("Shopify API error: missing {0}")]
    NotConfigured(&'static str),

    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("Shopify API error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Upstream answered with a non-2xx status.
    #[error("Shopify API error: {status} {body}")]
    Status {
        status: u16,
        /// Raw response body, for diagnostics.
        body: String,
    },

    /// A 2xx body that is not the expected JSON shape.
    #[error("Shopify API error: unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Optional upstream-side filters for the listing endpoint.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct OrderFilter {
    pub name: Option<String>,
    pub email: Option<String>,
    pub limit: Option<u32>,
}

/// Read access to upstream orders.
#[async_trait]
pub trait OrderSource: Send + Sync {
    /// `orders.json?status=any&limit={limit}`, newest first.
    async fn list_recent_orders(&self, limit: u32) -> Result<Value, UpstreamError>;

    /// `orders/{id}.json`. `Ok(None)` when upstream answers 404.
    async fn get_order_by_id(&self, id: &str) -> Result<Option<Value>, UpstreamError>;

    /// `orders.json?status=any` narrowed by `filter`.
    async fn find_orders(&self, filter: &OrderFilter) -> Result<Value, UpstreamError>;
}

/// [`OrderSource`] backed by the Admin REST API.
pub struct ShopifyClient {
    client: reqwest::Client,
    api_root: Option<String>,
    access_token: Option<String>,
}

impl ShopifyClient {
    /// Builds the client with the configured per-request timeout.
    ///
    /// Missing credentials do not fail construction; each call then fails
    /// with [`UpstreamError::NotConfigured`].
    pub fn new(config: &ShopifyConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self::with_client(client, config))
    }

    /// Reuses an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: &ShopifyConfig) -> Self {
        Self {
            client,
            api_root: config.api_root(),
            access_token: config.access_token.clone(),
        }
    }

    fn get(&self, path: &str) -> Result<reqwest::RequestBuilder, UpstreamError> {
        let root = self.api_root.as_deref().ok_or(UpstreamError::NotConfigured("SHOPIFY_SHOP"))?;
        let token = self.access_token.as_deref().ok_or(UpstreamError::NotConfigured("SHOPIFY_TOKEN"))?;
        Ok(self.client
            .get(format!("{root}/{path}"))
            .header("X-Shopify-Access-Token", token)
            .header(reqwest::header::CONTENT_TYPE, "application/json"))
    }

    // ---- private helpers ----

    /// Returns the response unchanged on 2xx, or an
    /// [`UpstreamError::Status`] carrying status and body text.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, UpstreamError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(UpstreamError::Status { status: status.as_u16(), body });
        }
        Ok(response)
    }

    async fn parse_response(response: reqwest::Response) -> Result<Value, UpstreamError> {
        let response = Self::ensure_success(response).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl OrderSource for ShopifyClient {
    async fn list_recent_orders(&self, limit: u32) -> Result<Value, UpstreamError> {
        debug!(limit, "listing recent orders");
        let response = self.get("orders.json")?
            .query(&[("status", "any".to_owned()), ("limit", limit.to_string())])
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn get_order_by_id(&self, id: &str) -> Result<Option<Value>, UpstreamError> {
        debug!(id, "fetching order by id");
        // Only digits reach this point from the resolver, but the id still
        // lands in a path segment.
        let id: String = url::form_urlencoded::byte_serialize(id.as_bytes()).collect();
        let response = self.get(&format!("orders/{id}.json"))?.send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::parse_response(response).await.map(Some)
    }

    async fn find_orders(&self, filter: &OrderFilter) -> Result<Value, UpstreamError> {
        debug!(?filter, "searching orders");
        let mut query = vec![("status", "any".to_owned())];
        if let Some(name) = &filter.name {
            query.push(("name", name.clone()));
        }
        if let Some(email) = &filter.email {
            query.push(("email", email.clone()));
        }
        if let Some(limit) = filter.limit {
            query.push(("limit", limit.to_string()));
        }
        let response = self.get("orders.json")?.query(&query).send().await?;
        Self::parse_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn config(shop: Option<&str>, token: Option<&str>) -> ShopifyConfig {
        ShopifyConfig {
            shop: shop.map(str::to_owned),
            access_token: token.map(str::to_owned),
            api_version: "2023-10".into(),
            base_url: None,
            timeout: Duration::from_secs(1),
        }
    }

    #[tokio::test]
    async fn unconfigured_client_fails_without_network() {
        let client = ShopifyClient::new(&config(None, Some("shpat_x"))).unwrap();
        let err = client.list_recent_orders(5).await.unwrap_err();
        assert!(matches!(err, UpstreamError::NotConfigured("SHOPIFY_SHOP")));

        let client = ShopifyClient::new(&config(Some("demo.myshopify.com"), None)).unwrap();
        let err = client.get_order_by_id("1").await.unwrap_err();
        assert!(matches!(err, UpstreamError::NotConfigured("SHOPIFY_TOKEN")));
    }

    #[test]
    fn status_error_carries_diagnostics() {
        let err = UpstreamError::Status { status: 503, body: "upstream down".into() };
        assert_eq!(err.to_string(), "Shopify API error: 503 upstream down");
    }
}
