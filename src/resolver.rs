//! Order resolution and contact verification.
//!
//! A request carries an order token and a contact hint. Resolution runs in
//! two steps:
//!
//! 1. **Locate** the order. With [`LookupStrategy::ScanThenId`] the newest
//!    page of orders is scanned for a matching name (or, for malformed
//!    names, an order-status URL containing the token); on a miss an
//!    all-digit token is tried as a platform ID. With
//!    [`LookupStrategy::Direct`] a long numeric token is fetched by ID and
//!    anything else is handed to upstream's `name=` filter.
//! 2. **Verify** the hint against the located order's email, and when
//!    [`MatchRules::phone_suffix`] is on, against the tail of its phone
//!    number. A mismatch is reported as [`ApiError::Forbidden`] without any
//!    order data attached.
//!
//! Only a verified order is turned into a [`TrackingSummary`].
//!
//! The scan covers one page of at most 250 orders. Older orders are reached
//! only through the by-ID fallback.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::ApiError;
use crate::order::{ContactHint, Order, OrderEnvelope, OrderList, OrderToken, TrackingSummary, digits};
use crate::upstream::{OrderFilter, OrderSource, UpstreamError};

/// How an order token is located upstream.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LookupStrategy {
    /// Scan the newest `scan_limit` orders, then fall back to by-ID.
    ScanThenId { scan_limit: u32 },
    /// By-ID for platform IDs, upstream `name=` filter otherwise.
    Direct,
}

/// Which contact fields may authorize disclosure.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MatchRules {
    /// Accept a hint whose digits are a suffix of the order's phone digits.
    pub phone_suffix: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ResolverConfig {
    pub lookup: LookupStrategy,
    pub rules: MatchRules,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            lookup: LookupStrategy::ScanThenId { scan_limit: crate::config::MAX_PAGE_SIZE },
            rules: MatchRules { phone_suffix: true },
        }
    }
}

pub struct Resolver {
    source: Arc<dyn OrderSource>,
    config: ResolverConfig,
}

impl Resolver {
    pub fn new(source: Arc<dyn OrderSource>, config: ResolverConfig) -> Self {
        Self { source, config }
    }

    /// Resolves raw request inputs into a summary for a verified caller.
    ///
    /// Missing or blank inputs fail with [`ApiError::BadRequest`] before any
    /// upstream request is made.
    pub async fn track(
        &self,
        order_id: Option<&str>,
        contact: Option<&str>,
    ) -> Result<TrackingSummary, ApiError> {
        let (Some(token), Some(hint)) = (
            order_id.and_then(OrderToken::parse),
            contact.and_then(ContactHint::parse),
        ) else {
            return Err(ApiError::BadRequest("order_id and email are required".into()));
        };

        let order = self.locate(&token).await?.ok_or(ApiError::NotFound)?;

        if !contact_matches(&order, &hint, self.config.rules) {
            warn!(token = token.as_str(), "contact hint does not match order");
            return Err(ApiError::Forbidden);
        }

        Ok(TrackingSummary::from_order(&order))
    }

    async fn locate(&self, token: &OrderToken) -> Result<Option<Order>, UpstreamError> {
        match self.config.lookup {
            LookupStrategy::ScanThenId { scan_limit } => {
                let page = self.source.list_recent_orders(scan_limit).await?;
                let page = OrderList::from_value(&page)?;
                if let Some(order) = find_in_page(page.orders, token) {
                    debug!(token = token.as_str(), "order resolved from recent page");
                    return Ok(Some(order));
                }
                if !token.is_numeric() {
                    return Ok(None);
                }
                self.fetch_by_id(token).await
            }
            LookupStrategy::Direct => {
                if token.is_platform_id() {
                    return self.fetch_by_id(token).await;
                }
                let filter = OrderFilter {
                    name: Some(token.as_str().to_owned()),
                    ..OrderFilter::default()
                };
                let found = OrderList::from_value(&self.source.find_orders(&filter).await?)?;
                Ok(found.orders.into_iter().next())
            }
        }
    }

    async fn fetch_by_id(&self, token: &OrderToken) -> Result<Option<Order>, UpstreamError> {
        let Some(body) = self.source.get_order_by_id(token.as_str()).await? else {
            return Ok(None);
        };
        debug!(token = token.as_str(), "order resolved by id");
        Ok(Some(OrderEnvelope::from_value(&body)?.order))
    }
}

/// First order in upstream order whose bare name equals the token. Only when
/// no name matches anywhere on the page, the first order whose order-status
/// URL contains the token.
pub fn find_in_page(orders: Vec<Order>, token: &OrderToken) -> Option<Order> {
    let token = token.as_str();
    let by_name = orders.iter().position(|order| order.clean_name() == Some(token));
    let index = by_name.or_else(|| {
        orders.iter().position(|order| {
            order.order_status_url.as_deref().is_some_and(|url| url.contains(token))
        })
    })?;
    orders.into_iter().nth(index)
}

/// True when `hint` authorizes disclosure of `order`.
///
/// Email: the hint, lowercased and stripped of whitespace, equals the order's
/// email case-insensitively. Phone: the order's digits end with the hint's
/// digits. An email-shaped hint is never compared as a phone, and empty
/// normal forms never match.
pub fn contact_matches(order: &Order, hint: &ContactHint, rules: MatchRules) -> bool {
    let email = hint.email_form();
    let email_ok = !email.is_empty()
        && order.email.as_deref().is_some_and(|e| e.trim().to_lowercase() == email);
    if email_ok {
        return true;
    }

    if !rules.phone_suffix || hint.is_email_shaped() {
        return false;
    }
    let wanted = hint.phone_digits();
    !wanted.is_empty()
        && order.phone.as_deref()
            .map(digits)
            .is_some_and(|on_file| on_file.ends_with(&wanted))
}
