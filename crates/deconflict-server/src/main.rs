//! Deconfliction server - mission checks over HTTP

use anyhow::Result;
use deconflict_server::{api, config::Config};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with((!config.log_json).then(tracing_subscriber::fmt::layer))
        .with(config.log_json.then(|| tracing_subscriber::fmt::layer().json()))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("deconflict_server=debug".parse()?)
                .add_directive("deconflict_core=info".parse()?),
        )
        .init();

    tracing::info!("Starting deconfliction server...");

    config.default_rules.validate()?;
    let port = config.server_port;

    let app = api::routes()
        .with_state(Arc::new(config))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
