use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

use cardscore::{Artifacts, ServeConfig, logging, server};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init()?;

    let config = ServeConfig::default();
    let artifacts = Artifacts::load(&config)
        .inspect_err(|e| error!(error = %e, "failed to load artifacts"))
        .context("cannot serve without model artifacts")?;

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "cardscore listening");

    server::serve(listener, Arc::new(artifacts), shutdown_signal()).await?;

    info!("cardscore stopped");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(e) => {
            warn!(error = %e, "cannot listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
