use std::sync::Arc;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use waybill::middleware::Cors;
use waybill::state::AppState;
use waybill::upstream::ShopifyClient;
use waybill::{Config, Server, routes};

#[tokio::main]
async fn main() -> Result<(), waybill::Error> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "waybill=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    config.report();

    let client = Arc::new(ShopifyClient::new(&config.shopify)?);
    let state = Arc::new(AppState::new(client, &config));

    Server::bind(config.addr)
        .await?
        .cors(config.cors_allow_origin.clone().map(Cors::allow_origin))
        .serve(routes::router(state))
        .await
}
