//! Serve command - runs the HTTP scoring service.

use anyhow::{Context, Result};
use config::Config;
use tokio::net::TcpListener;
use tracing::info;

use crate::server::{AppState, router};

/// Runs the scoring service until Ctrl-C.
///
/// # Errors
///
/// Returns an error if an existing model bundle cannot be read or the
/// address cannot be bound.
pub async fn run(config: &Config) -> Result<()> {
    let state = AppState::load(&config.paths().model_path)?;

    let listener = TcpListener::bind(config.scoring_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.scoring_addr))?;

    info!(addr = %config.scoring_addr, "Scoring service listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await
        .context("Scoring service failed")?;

    info!("Scoring service stopped");
    Ok(())
}
