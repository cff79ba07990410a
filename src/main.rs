use std::sync::Arc;

use chronicle::{config::Config, model::app::AppState, router, startup};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let db = startup::connect_to_database(&config)
        .await
        .expect("Failed to connect to database");
    let cache = startup::build_cache(&config);

    startup::spawn_cache_sweeper(cache.clone(), &config);

    let address = config.server_address.clone();
    let state = AppState::new(db, cache, Arc::new(config));
    let router = router::routes().with_state(state);

    tracing::info!("Starting server on {address}");

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .expect("Failed to bind server address");

    axum::serve(listener, router)
        .await
        .expect("Server exited with an error");
}
