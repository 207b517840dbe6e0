use std::net::SocketAddr;
use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::signal;
use tracing::info;

use waza_app::http::{AppState, build_router};
use waza_client::config::Config;
use waza_client::http_client::{ReqwestNutrientClient, ReqwestWazaClient};
use waza_client::{NutrientLookup, WazaApiClient};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Configure logging from env var `WAZA_LOG_LEVEL` (or fallback to `RUST_LOG`, default `info`).
    let log_env = std::env::var("WAZA_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(log_env.clone())
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
    tracing::info!(%log_env, "waza_app: log filter");

    let builder = PrometheusBuilder::new();
    let handle = builder.install_recorder()?;

    let cfg = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(%e, "missing configuration; aborting startup");
            std::process::exit(1);
        }
    };

    let client: Arc<dyn WazaApiClient> = Arc::new(ReqwestWazaClient::from_config(&cfg));
    let nutrients: Arc<dyn NutrientLookup> = Arc::new(ReqwestNutrientClient::from_config(&cfg));
    let state = Arc::new(AppState::new(client, nutrients, Some(handle)));

    let app = build_router(state);

    let addr: SocketAddr = std::env::var("ADDRESS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 3000)));
    info!(%addr, "starting HTTP server");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to address {addr}: {e}");
            std::process::exit(1);
        }
    };

    let server = axum::serve(listener, app.into_make_service());
    if let Err(e) = server
        .with_graceful_shutdown(async {
            signal::ctrl_c()
                .await
                .expect("failed to install ctrl+c handler");
        })
        .await
    {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }

    Ok(())
}
