//! # waybill
//!
//! Order-tracking proxy in front of the Shopify Admin API.
//!
//! A shopper sends an order number and the email or phone number on the
//! order. waybill finds the order upstream, checks the contact details, and
//! answers with a short tracking summary: payment and fulfillment status,
//! when it was placed and shipped, and the carrier tracking number and URL.
//! Nothing is stored; every request is one or two reads against the Admin
//! API.
//!
//! ## Layout
//!
//! - [`resolver`]: locating the order and verifying the contact hint.
//! - [`upstream`]: the [`OrderSource`](upstream::OrderSource) seam and the
//!   reqwest-backed [`ShopifyClient`](upstream::ShopifyClient).
//! - [`routes`]: the HTTP endpoints.
//! - [`Server`], [`Router`], [`Request`], [`Response`]: a small hyper-based
//!   HTTP layer. TLS, rate limiting and body limits belong to the reverse
//!   proxy in front.
//!
//! ## Running
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use waybill::{Config, Server, routes, state::AppState, upstream::ShopifyClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), waybill::Error> {
//!     let config = Config::from_env()?;
//!     let client = Arc::new(ShopifyClient::new(&config.shopify)?);
//!     let app = routes::router(Arc::new(AppState::new(client, &config)));
//!     Server::bind(config.addr).await?.serve(app).await
//! }
//! ```

mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod config;
pub mod health;
pub mod middleware;
pub mod mock;
pub mod order;
pub mod resolver;
pub mod routes;
pub mod state;
pub mod upstream;

pub use config::Config;
pub use error::{ApiError, Error};
pub use handler::Handler;
pub use method::Method;
pub use request::Request;
pub use response::{IntoResponse, Json, Response};
pub use router::Router;
pub use server::Server;
pub use status::Status;
