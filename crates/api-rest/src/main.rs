//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own.
//!
//! ## Intended use
//! This binary is useful for development and debugging when you want the health endpoints and
//! Swagger UI against an already populated graph. It does not load sample data; the workspace's
//! main `caregraph-run` binary seeds the store before serving.

use caregraph_core::constants::{DEFAULT_REST_ADDR, ENV_REST_ADDR};
use caregraph_core::GraphConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var(ENV_REST_ADDR).unwrap_or_else(|_| DEFAULT_REST_ADDR.into());

    let cfg = GraphConfig::from_env()?;
    tracing::info!("Connecting to graph store: {:?}", cfg);
    let store = caregraph_core::connect(&cfg).await?;

    api_rest::serve(&addr, api_rest::AppState::new(store)).await
}
