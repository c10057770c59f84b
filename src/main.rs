mod routes;
mod state;

use std::sync::Arc;

use analysis::{OverpassClient, OverpassConfig};

const DEFAULT_PORT: u16 = 5000;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!(error = %e, "no .env file loaded");
    }

    let port: u16 = std::env::var("PORT")
        .map_or(DEFAULT_PORT, |raw| raw.parse().expect("invalid PORT"));

    let config = OverpassConfig::from_env().expect("invalid Overpass configuration");
    let client = OverpassClient::new(&config).expect("failed to build Overpass client");
    tracing::info!(
        url = client.url(),
        request_timeout_secs = config.timeouts.request_secs,
        query_timeout_secs = config.timeouts.query_secs,
        "Overpass client initialized"
    );

    let state = state::AppState::new(Arc::new(client));

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "omniview listening");
    axum::serve(listener, app).await.expect("server failed");
}
