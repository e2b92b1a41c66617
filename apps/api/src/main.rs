use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use match_api::config::Config;
use match_api::db::create_pool;
use match_api::matching::pg_store::PgMatchStore;
use match_api::matching::store::{InMemoryMatchStore, MatchStore};
use match_api::routes::build_router;
use match_api::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("match_api={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Match API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the persistence collaborator
    let store: Arc<dyn MatchStore> = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url, config.db_max_connections).await?;
            Arc::new(PgMatchStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set; using the in-memory match store");
            Arc::new(InMemoryMatchStore::new())
        }
    };

    info!(
        "Matcher: table size {}, sort algorithm {}",
        config.match_table_size, config.sort_algorithm
    );

    // Build app state
    let state = AppState::new(config.clone(), store);

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
