use std::sync::Arc;

use anyhow::{Context, Result};

use pawhaven::api::{self, AppState};
use pawhaven::auth::TokenMapVerifier;
use pawhaven::config::Config;
use pawhaven::logging::{self, LogWriter, RetentionPolicy, RotationScheduler};
use pawhaven::store::DocumentStore;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;

    // Open today's log file BEFORE any tracing calls; without file logging
    // the server does not start
    let writer = LogWriter::new(config.logging.directory.clone());
    writer.initialize().context("Failed to initialize logging")?;
    logging::init_tracing(&writer)?;

    tracing::info!("Starting Pawhaven backend server");
    if let Some(path) = writer.active_path() {
        tracing::info!("Logging to: {}", path.display());
    }

    let policy = RetentionPolicy {
        max_age: config.logging.max_age(),
        max_count: config.logging.max_file_count,
    };
    let scheduler = Arc::new(RotationScheduler::new(
        writer.clone(),
        policy,
        config.logging.tick_interval(),
    ));
    scheduler.start();

    let state = AppState {
        store: Arc::new(DocumentStore::new()),
        verifier: Arc::new(TokenMapVerifier::new(config.auth.tokens.clone())),
        log_service: Some(Arc::clone(&scheduler)),
    };
    let app = api::router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Server running on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("Shutting down server");
        })
        .await
        .context("Server failed")?;

    // Rendezvous with the housekeeping loop, then release the log file
    scheduler.stop().await;
    writer.close();
    Ok(())
}
