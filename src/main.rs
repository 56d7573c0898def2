//! CareGraph runner.
//!
//! Connects to the configured graph store, loads the sample data set and then serves the REST
//! API. Use `caregraph-api-rest` to serve without seeding.

use api_shared::HealthService;
use caregraph_core::constants::{DEFAULT_REST_ADDR, ENV_REST_ADDR};
use caregraph_core::{GraphConfig, Repositories};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("caregraph=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var(ENV_REST_ADDR).unwrap_or_else(|_| DEFAULT_REST_ADDR.into());

    let cfg = GraphConfig::from_env()?;
    tracing::info!("++ Starting CareGraph with {:?}", cfg);

    let store = caregraph_core::connect(&cfg).await?;
    tracing::info!("{}", HealthService::new(store.clone()).check_graph().await);

    let repos = Repositories::new(store.clone());
    caregraph_core::seed(&repos).await?;
    let stats = repos.stats().await?;
    tracing::info!(
        "Graph holds {} nodes and {} relationships",
        stats.total_nodes(),
        stats.total_edges()
    );

    api_rest::serve(&rest_addr, api_rest::AppState::new(store)).await
}
