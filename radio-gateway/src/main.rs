use std::error::Error;
use std::sync::Arc;

use axum_server::tls_rustls::RustlsConfig;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use radio_gateway::config::Config;
use radio_gateway::directory::{DirectoryClient, DirectoryClientConfig};
use radio_gateway::metrics::PrometheusMetrics;
use radio_gateway::proxy::UpstreamClient;
use radio_gateway::web::{AppState, create_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Fail fast on missing or inconsistent settings
    let config = Config::parse();
    config.validate()?;

    let directory = DirectoryClient::new(DirectoryClientConfig::new(&config.api_endpoint))?;
    let upstream = UpstreamClient::new()?;
    let metrics = Arc::new(PrometheusMetrics::new()?);

    let state = AppState::new(directory, upstream, metrics);
    let app = create_router(state);

    let addr = config.listen_addr();
    info!(directory = %config.api_endpoint, "using station directory");

    match config.tls()? {
        Some(tls) => {
            let rustls = RustlsConfig::from_pem_file(&tls.cert, &tls.key).await?;
            info!(%addr, "starting HTTPS server");
            axum_server::bind_rustls(addr, rustls)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            info!(%addr, "starting HTTP server");
            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
