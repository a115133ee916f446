//! Order data: caller inputs, the upstream order record, and the tracking
//! summary returned to callers.
//!
//! Upstream records are decoded leniently. Every field the summary needs is
//! optional and unknown fields are ignored, so a schema addition upstream
//! never breaks tracking.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Minimum length of an all-digit token treated as a platform order ID
/// rather than a display name.
pub const PLATFORM_ID_MIN_DIGITS: usize = 10;

// ── Caller inputs ─────────────────────────────────────────────────────────────

/// Caller-supplied order identifier with any leading `#` and surrounding
/// whitespace removed. `"#1001"`, `" 1001 "` and `"1001"` are the same token.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OrderToken(String);

impl OrderToken {
    /// Returns `None` when nothing is left after normalization.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let clean = trimmed.strip_prefix('#').unwrap_or(trimmed).trim();
        (!clean.is_empty()).then(|| Self(clean.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// All ASCII digits, so it can be tried as an upstream numeric ID.
    pub fn is_numeric(&self) -> bool {
        self.0.bytes().all(|b| b.is_ascii_digit())
    }

    /// Long enough to be the platform's internal ID rather than an order
    /// number.
    pub fn is_platform_id(&self) -> bool {
        self.is_numeric() && self.0.len() >= PLATFORM_ID_MIN_DIGITS
    }
}

/// Caller-supplied email or phone number in whatever format they typed it.
#[derive(Clone, Debug)]
pub struct ContactHint(String);

impl ContactHint {
    /// Returns `None` for a blank hint.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_owned()))
    }

    /// Lowercased with all whitespace removed.
    pub fn email_form(&self) -> String {
        self.0.chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect()
    }

    /// Only the ASCII digits, in order.
    pub fn phone_digits(&self) -> String {
        digits(&self.0)
    }

    /// Contains an `@`, so it is compared as an email only.
    pub fn is_email_shaped(&self) -> bool {
        self.0.contains('@')
    }
}

pub(crate) fn digits(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}

// ── Upstream records ──────────────────────────────────────────────────────────

/// One order as returned by the Admin API.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Order {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub financial_status: Option<String>,
    #[serde(default)]
    pub fulfillment_status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub fulfillments: Option<Vec<Fulfillment>>,
    #[serde(default)]
    pub order_status_url: Option<String>,
}

impl Order {
    /// Display name without the `#` prefix, e.g. `"1001"` for `"#1001"`.
    pub fn clean_name(&self) -> Option<&str> {
        let name = self.name.as_deref()?.trim();
        Some(name.strip_prefix('#').unwrap_or(name).trim())
    }

    pub fn first_fulfillment(&self) -> Option<&Fulfillment> {
        self.fulfillments.as_deref()?.first()
    }
}

/// A shipment recorded against an order.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Fulfillment {
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub tracking_url: Option<String>,
}

/// `{"orders": [...]}` from the listing endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct OrderList {
    #[serde(default)]
    pub orders: Vec<Order>,
}

/// `{"order": {...}}` from the single-order endpoint.
#[derive(Debug, Deserialize)]
pub struct OrderEnvelope {
    pub order: Order,
}

impl OrderList {
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }
}

impl OrderEnvelope {
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }
}

// ── Output ────────────────────────────────────────────────────────────────────

/// What a verified caller gets back. Optional fields serialize as `null`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct TrackingSummary {
    pub order_id: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub financial_status: Option<String>,
    pub fulfillment_status: String,
    pub placed_at: Option<String>,
    pub shipped_at: Option<String>,
    pub tracking_number: Option<String>,
    pub tracking_url: Option<String>,
    pub order_status_url: Option<String>,
}

impl TrackingSummary {
    /// Builds the summary. Only call this after the contact hint has been
    /// verified against `order`.
    pub(crate) fn from_order(order: &Order) -> Self {
        let shipment = order.first_fulfillment();

        Self {
            order_id: order.name.clone(),
            email: order.email.clone(),
            phone: non_empty(&order.phone),
            financial_status: order.financial_status.clone(),
            fulfillment_status: non_empty(&order.fulfillment_status)
                .unwrap_or_else(|| "unfulfilled".to_owned()),
            placed_at: order.created_at.clone(),
            shipped_at: shipment.and_then(|f| non_empty(&f.created_at)),
            tracking_number: shipment.and_then(|f| non_empty(&f.tracking_number)),
            tracking_url: shipment.and_then(|f| non_empty(&f.tracking_url)),
            order_status_url: order.order_status_url.clone(),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().filter(|s| !s.is_empty()).map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn token_strips_hash_and_whitespace() {
        assert_eq!(OrderToken::parse(" #1001 ").unwrap().as_str(), "1001");
        assert_eq!(OrderToken::parse("1001").unwrap().as_str(), "1001");
        assert_eq!(OrderToken::parse("# 1001").unwrap().as_str(), "1001");
        assert!(OrderToken::parse("#").is_none());
        assert!(OrderToken::parse("   ").is_none());
    }

    #[test]
    fn token_classification() {
        let long = OrderToken::parse("6365486809282").unwrap();
        assert!(long.is_numeric() && long.is_platform_id());

        let short = OrderToken::parse("#1001").unwrap();
        assert!(short.is_numeric() && !short.is_platform_id());

        assert!(!OrderToken::parse("GP-1001").unwrap().is_numeric());
    }

    #[test]
    fn hint_normal_forms() {
        let hint = ContactHint::parse(" Jane @Example.COM ").unwrap();
        assert_eq!(hint.email_form(), "jane@example.com");

        let hint = ContactHint::parse("+1 (555) 123-4567").unwrap();
        assert_eq!(hint.phone_digits(), "15551234567");

        assert!(ContactHint::parse(" \t").is_none());

        assert!(ContactHint::parse("jane7@example.com").unwrap().is_email_shaped());
        assert!(!ContactHint::parse("555 123 4567").unwrap().is_email_shaped());
    }

    #[test]
    fn decodes_listing_and_ignores_unknown_fields() {
        let list = OrderList::from_value(&json!({
            "orders": [
                { "id": 450789469, "name": "#1001", "email": "jane@example.com", "total_price": "10.00" },
                { "id": 450789470, "name": "#1002", "email": null, "phone": "+15551234567" }
            ]
        }))
        .unwrap();
        assert_eq!(list.orders.len(), 2);
        assert_eq!(list.orders[0].clean_name(), Some("1001"));
        assert_eq!(list.orders[1].email, None);
    }

    #[test]
    fn summary_defaults_unfulfilled_and_nulls_without_shipments() {
        let order = Order {
            name: Some("#1001".into()),
            email: Some("jane@example.com".into()),
            financial_status: Some("paid".into()),
            created_at: Some("2024-03-01T10:00:00-05:00".into()),
            ..Order::default()
        };
        let value = serde_json::to_value(TrackingSummary::from_order(&order)).unwrap();
        assert_eq!(
            value,
            json!({
                "order_id": "#1001",
                "email": "jane@example.com",
                "phone": null,
                "financial_status": "paid",
                "fulfillment_status": "unfulfilled",
                "placed_at": "2024-03-01T10:00:00-05:00",
                "shipped_at": null,
                "tracking_number": null,
                "tracking_url": null,
                "order_status_url": null
            })
        );
    }

    #[test]
    fn summary_takes_first_fulfillment() {
        let envelope = OrderEnvelope::from_value(&json!({
            "order": {
                "name": "#1001",
                "fulfillment_status": "fulfilled",
                "fulfillments": [
                    { "created_at": "2024-03-02T09:00:00-05:00", "tracking_number": "1Z999", "tracking_url": "https://ups.example/1Z999" },
                    { "created_at": "2024-03-05T09:00:00-05:00", "tracking_number": "1Z000", "tracking_url": null }
                ]
            }
        }))
        .unwrap();
        let summary = TrackingSummary::from_order(&envelope.order);
        assert_eq!(summary.fulfillment_status, "fulfilled");
        assert_eq!(summary.shipped_at.as_deref(), Some("2024-03-02T09:00:00-05:00"));
        assert_eq!(summary.tracking_number.as_deref(), Some("1Z999"));
        assert_eq!(summary.tracking_url.as_deref(), Some("https://ups.example/1Z999"));
    }

    #[test]
    fn empty_tracking_strings_become_null() {
        let order = Order {
            fulfillments: Some(vec![Fulfillment {
                created_at: Some("2024-03-02T09:00:00Z".into()),
                tracking_number: Some(String::new()),
                tracking_url: None,
            }]),
            ..Order::default()
        };
        let summary = TrackingSummary::from_order(&order);
        assert_eq!(summary.tracking_number, None);
        assert_eq!(summary.shipped_at.as_deref(), Some("2024-03-02T09:00:00Z"));
    }
}
