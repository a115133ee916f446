//! Process configuration, read once at startup.
//!
//! | Env var                | Default                   |
//! |------------------------|---------------------------|
//! | `SHOPIFY_SHOP`         | none (warns "Missing")    |
//! | `SHOPIFY_TOKEN`        | none (warns "Missing")    |
//! | `SHOPIFY_API_VERSION`  | `2023-10`                 |
//! | `SHOPIFY_API_BASE_URL` | `https://{SHOPIFY_SHOP}`  |
//! | `HOST`                 | `0.0.0.0`                 |
//! | `PORT`                 | `3000`                    |
//! | `REQUEST_TIMEOUT_SECS` | `10`                      |
//! | `ORDER_SCAN_LIMIT`     | `250` (clamped to 1..=250)|
//! | `ORDERS_PREVIEW_LIMIT` | `5`                       |
//! | `DIAGNOSTIC_ORDER_ID`  | `6365486809282`           |
//! | `ORDER_LOOKUP`         | `scan` (`scan`/`direct`)  |
//! | `PHONE_MATCH`          | `true`                    |
//! | `CORS_ALLOW_ORIGIN`    | `*` (empty disables)      |

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use tracing::{info, warn};

use crate::resolver::{LookupStrategy, MatchRules, ResolverConfig};

/// Largest page the Admin API hands out in one listing call.
pub const MAX_PAGE_SIZE: u32 = 250;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} has invalid value `{value}`: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Connection details for the Shopify Admin API.
#[derive(Clone, Debug)]
pub struct ShopifyConfig {
    pub shop: Option<String>,
    pub access_token: Option<String>,
    pub api_version: String,
    pub base_url: Option<String>,
    pub timeout: Duration,
}

impl ShopifyConfig {
    /// `{base}/admin/api/{version}`, or `None` when neither the shop domain
    /// nor an explicit base URL is configured.
    pub fn api_root(&self) -> Option<String> {
        let base = match (&self.base_url, &self.shop) {
            (Some(url), _) => url.trim_end_matches('/').to_owned(),
            (None, Some(shop)) => format!("https://{shop}"),
            (None, None) => return None,
        };
        Some(format!("{base}/admin/api/{}", self.api_version))
    }

    /// Shop and token are both present.
    pub fn is_complete(&self) -> bool {
        self.api_root().is_some() && self.access_token.is_some()
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub shopify: ShopifyConfig,
    pub resolver: ResolverConfig,
    pub orders_preview_limit: u32,
    pub diagnostic_order_id: String,
    pub cors_allow_origin: Option<String>,
}

impl Config {
    /// Reads the process environment (after `.env`, if the caller loaded it).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Blank values count as
    /// unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let host: IpAddr = parse_or(&get, "HOST", IpAddr::V4(Ipv4Addr::UNSPECIFIED))?;
        let port: u16 = parse_or(&get, "PORT", 3000)?;

        let shopify = ShopifyConfig {
            shop: get("SHOPIFY_SHOP"),
            access_token: get("SHOPIFY_TOKEN"),
            api_version: get("SHOPIFY_API_VERSION").unwrap_or_else(|| "2023-10".into()),
            base_url: get("SHOPIFY_API_BASE_URL"),
            timeout: Duration::from_secs(parse_or(&get, "REQUEST_TIMEOUT_SECS", 10)?),
        };

        let scan_limit: u32 = parse_or(&get, "ORDER_SCAN_LIMIT", MAX_PAGE_SIZE)?;
        let lookup_strategy = match get("ORDER_LOOKUP").as_deref() {
            None | Some("scan") => LookupStrategy::ScanThenId {
                scan_limit: scan_limit.clamp(1, MAX_PAGE_SIZE),
            },
            Some("direct") => LookupStrategy::Direct,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "ORDER_LOOKUP",
                    value: other.to_owned(),
                    reason: "expected `scan` or `direct`".into(),
                });
            }
        };
        let rules = MatchRules { phone_suffix: parse_or(&get, "PHONE_MATCH", true)? };

        // Unlike the other keys, an explicitly empty value here is meaningful.
        let cors_allow_origin = match lookup("CORS_ALLOW_ORIGIN") {
            Some(v) if v.trim().is_empty() => None,
            Some(v) => Some(v.trim().to_owned()),
            None => Some("*".to_owned()),
        };

        Ok(Self {
            addr: SocketAddr::new(host, port),
            shopify,
            resolver: ResolverConfig { lookup: lookup_strategy, rules },
            orders_preview_limit: parse_or(&get, "ORDERS_PREVIEW_LIMIT", 5u32)?.clamp(1, MAX_PAGE_SIZE),
            diagnostic_order_id: get("DIAGNOSTIC_ORDER_ID").unwrap_or_else(|| "6365486809282".into()),
            cors_allow_origin,
        })
    }

    /// Logs the loaded values. Missing credentials are reported, not fatal,
    /// so the liveness route stays up while the shop is being configured.
    pub fn report(&self) {
        let shop = self.shopify.shop.as_deref().unwrap_or("Missing");
        let token = if self.shopify.access_token.is_some() { "Loaded" } else { "Missing" };
        info!(
            addr = %self.addr,
            shop,
            token,
            api_version = %self.shopify.api_version,
            lookup = ?self.resolver.lookup,
            phone_match = self.resolver.rules.phone_suffix,
            "loaded configuration"
        );
        if !self.shopify.is_complete() {
            warn!(shop, token, "Shopify credentials incomplete; order routes will fail until configured");
        }
    }
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get(key) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let env: HashMap<String, String> = pairs.iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.addr.port(), 3000);
        assert_eq!(cfg.shopify.api_version, "2023-10");
        assert_eq!(cfg.shopify.timeout, Duration::from_secs(10));
        assert_eq!(cfg.orders_preview_limit, 5);
        assert_eq!(cfg.diagnostic_order_id, "6365486809282");
        assert_eq!(cfg.resolver.lookup, LookupStrategy::ScanThenId { scan_limit: 250 });
        assert!(cfg.resolver.rules.phone_suffix);
        assert_eq!(cfg.cors_allow_origin.as_deref(), Some("*"));
        assert!(!cfg.shopify.is_complete());
    }

    #[test]
    fn builds_api_root_from_shop_or_override() {
        let cfg = config(&[("SHOPIFY_SHOP", "demo.myshopify.com"), ("SHOPIFY_TOKEN", "shpat_x")]).unwrap();
        assert_eq!(cfg.shopify.api_root().as_deref(), Some("https://demo.myshopify.com/admin/api/2023-10"));
        assert!(cfg.shopify.is_complete());

        let cfg = config(&[
            ("SHOPIFY_SHOP", "demo.myshopify.com"),
            ("SHOPIFY_API_BASE_URL", "http://127.0.0.1:9000/"),
            ("SHOPIFY_API_VERSION", "2024-07"),
        ])
        .unwrap();
        assert_eq!(cfg.shopify.api_root().as_deref(), Some("http://127.0.0.1:9000/admin/api/2024-07"));
    }

    #[test]
    fn scan_limit_is_clamped_to_page_size() {
        let cfg = config(&[("ORDER_SCAN_LIMIT", "1000")]).unwrap();
        assert_eq!(cfg.resolver.lookup, LookupStrategy::ScanThenId { scan_limit: 250 });
    }

    #[test]
    fn direct_lookup_with_email_only_matching() {
        let cfg = config(&[("ORDER_LOOKUP", "direct"), ("PHONE_MATCH", "false")]).unwrap();
        assert_eq!(cfg.resolver.lookup, LookupStrategy::Direct);
        assert!(!cfg.resolver.rules.phone_suffix);
    }

    #[test]
    fn malformed_values_are_errors() {
        let err = config(&[("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
        assert!(config(&[("ORDER_LOOKUP", "graphql")]).is_err());
        assert!(config(&[("PHONE_MATCH", "yes")]).is_err());
    }

    #[test]
    fn empty_cors_origin_disables_header() {
        let cfg = config(&[("CORS_ALLOW_ORIGIN", "")]).unwrap();
        assert_eq!(cfg.cors_allow_origin, None);
    }
}
