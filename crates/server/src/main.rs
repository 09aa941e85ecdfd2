mod bootstrap;
mod chat;
mod erp;
mod error;
mod health;
mod routes;

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use aria_core::config::{AppConfig, LoadOptions};
use tokio::sync::Notify;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_logging(config: &AppConfig) {
    use aria_core::config::LogFormat::*;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str()));

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_env_filter(filter).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_env_filter(filter).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_env_filter(filter).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;
    let router = routes::router(&app);

    let address = format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!(
        event_name = "system.server.started",
        bind_address = %address,
        erp_url = %app.config.erp.url,
        "aria-server listening"
    );

    let stop = Arc::new(Notify::new());
    let stopped = stop.clone();
    let server = axum::serve(listener, router)
        .with_graceful_shutdown(async move { stopped.notified().await })
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => {
            result?;
            return Ok(());
        }
        signal = tokio::signal::ctrl_c() => signal?,
    }

    let grace = Duration::from_secs(app.config.server.graceful_shutdown_secs);
    info!(
        event_name = "system.server.stopping",
        grace_secs = grace.as_secs(),
        "draining in-flight requests"
    );
    stop.notify_one();
    match tokio::time::timeout(grace, server).await {
        Ok(result) => result?,
        Err(_) => warn!(
            event_name = "system.server.drain_timeout",
            "in-flight requests did not finish before the grace period"
        ),
    }

    app.db_pool.close().await;
    info!(event_name = "system.server.stopped", "aria-server stopped");
    Ok(())
}
