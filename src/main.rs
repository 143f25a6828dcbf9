use clap::Parser;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use evaws::{
    Config,
    handlers::{AppState, create_router},
    storage::LocalDatastoreRouter,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // RUST_LOG wins over --log-level
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    // One datastore per species, loaded on first use
    let datastores = Arc::new(LocalDatastoreRouter::new(
        config.data_dir.clone(),
        config.db_prefix.clone(),
    ));

    let state = AppState {
        datastores,
        base_url: config.effective_base_url(),
        paging: config.paging(),
        docs_species: config.docs_species.clone(),
    };

    let app = create_router(state).layer(TraceLayer::new_for_http());

    let app = if config.cors {
        app.layer(CorsLayer::permissive())
    } else {
        app
    };

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!(
        %addr,
        data_dir = %config.data_dir.display(),
        db_prefix = %config.db_prefix,
        "starting evaws"
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
