//! In-memory [`OrderSource`] for tests.
//!
//! Holds raw order JSON the way the Admin API would return it and records
//! every call, so tests can assert both on what the resolver returns and on
//! which upstream requests it made.
//!
//! ```rust
//! use serde_json::json;
//! use waybill::mock::MockOrderSource;
//!
//! let source = MockOrderSource::new(vec![
//!     json!({ "id": 450789469, "name": "#1001", "email": "jane@example.com" }),
//! ]);
//! assert!(source.calls().is_empty());
//! ```

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::upstream::{OrderFilter, OrderSource, UpstreamError};

/// One recorded upstream request.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Call {
    ListRecent(u32),
    GetById(String),
    Find(OrderFilter),
}

/// Which [`OrderSource`] operation a call or an injected failure targets.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Op {
    ListRecent,
    GetById,
    Find,
}

impl Call {
    pub fn op(&self) -> Op {
        match self {
            Self::ListRecent(_) => Op::ListRecent,
            Self::GetById(_) => Op::GetById,
            Self::Find(_) => Op::Find,
        }
    }
}

#[derive(Default)]
pub struct MockOrderSource {
    orders: Vec<Value>,
    failures: Vec<(Op, u16, String)>,
    calls: Mutex<Vec<Call>>,
}

impl MockOrderSource {
    /// `orders` are listed in the given order, newest first.
    pub fn new(orders: Vec<Value>) -> Self {
        Self { orders, ..Self::default() }
    }

    /// Every call fails with `status` and `body`, as a broken upstream would.
    pub fn failing(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        [Op::ListRecent, Op::GetById, Op::Find]
            .into_iter()
            .fold(Self::default(), |mock, op| mock.return_err(op, status, body.clone()))
    }

    /// Calls to `op` fail with `status` and `body`; other calls answer from
    /// the stored orders.
    pub fn return_err(mut self, op: Op, status: u16, body: impl Into<String>) -> Self {
        self.failures.push((op, status, body.into()));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: Call) -> Result<(), UpstreamError> {
        let op = call.op();
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
        match self.failures.iter().find(|(target, ..)| *target == op) {
            Some((_, status, body)) => Err(UpstreamError::Status { status: *status, body: body.clone() }),
            None => Ok(()),
        }
    }
}

fn bare_name(name: &str) -> &str {
    name.trim().trim_start_matches('#')
}

#[async_trait]
impl OrderSource for MockOrderSource {
    async fn list_recent_orders(&self, limit: u32) -> Result<Value, UpstreamError> {
        self.record(Call::ListRecent(limit))?;
        let page: Vec<&Value> = self.orders.iter().take(limit as usize).collect();
        Ok(json!({ "orders": page }))
    }

    async fn get_order_by_id(&self, id: &str) -> Result<Option<Value>, UpstreamError> {
        self.record(Call::GetById(id.to_owned()))?;
        let found = self.orders.iter().find(|o| {
            o.get("id").and_then(Value::as_u64).is_some_and(|oid| oid.to_string() == id)
        });
        Ok(found.map(|order| json!({ "order": order })))
    }

    async fn find_orders(&self, filter: &OrderFilter) -> Result<Value, UpstreamError> {
        self.record(Call::Find(filter.clone()))?;
        let field = |o: &Value, key: &str| o.get(key).and_then(Value::as_str).map(str::to_owned);
        let page: Vec<&Value> = self.orders.iter()
            .filter(|o| match &filter.name {
                Some(name) => field(o, "name").is_some_and(|n| bare_name(&n) == bare_name(name)),
                None => true,
            })
            .filter(|o| match &filter.email {
                Some(email) => field(o, "email").is_some_and(|e| e.eq_ignore_ascii_case(email)),
                None => true,
            })
            .take(filter.limit.map_or(usize::MAX, |l| l as usize))
            .collect();
        Ok(json!({ "orders": page }))
    }
}
