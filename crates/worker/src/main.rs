use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use leetboard_core::metrics::Metrics;
use leetboard_leetcode::LeetCodeClient;
use leetboard_worker::background::{PeriodRollover, Poller};
use leetboard_worker::config::EngineConfig;
use leetboard_worker::context::EngineContext;
use leetboard_worker::service::LeaderboardService;

/// How long each background loop gets to finish after cancellation.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "leetboard_worker=debug,leetboard_db=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = EngineConfig::from_env().context("Invalid configuration")?;
    tracing::info!(
        period = %config.period,
        scoring = ?config.scoring,
        poll_interval_secs = config.poll_interval.as_secs(),
        "Loaded engine configuration"
    );

    // --- Database ---
    let pool = leetboard_db::create_pool(&config.database_url)
        .await
        .context("Failed to open database")?;
    tracing::info!("Database connection pool created");

    leetboard_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    tracing::info!("Database health check passed");

    leetboard_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    // --- Engine ---
    let metrics = Metrics::new().context("Failed to register metrics")?;
    let ctx = EngineContext::from_config(pool, &config, metrics.clone());
    let service = LeaderboardService::new(ctx);

    let client = LeetCodeClient::new(
        config.leetcode_endpoint.clone(),
        config.fetch_timeout,
        metrics.clone(),
    )
    .context("Failed to build LeetCode client")?;
    tracing::info!(endpoint = client.endpoint(), "LeetCode client ready");

    // --- Background loops ---
    let cancel = CancellationToken::new();

    let poller = Poller::new(
        service.clone(),
        Arc::new(client),
        config.poll_interval,
        config.fetch_timeout,
    );
    let poller_handle = tokio::spawn(poller.run(cancel.clone()));

    let rollover = PeriodRollover::new(service, config.rollover_check_interval);
    let rollover_handle = tokio::spawn(rollover.run(cancel.clone()));

    tracing::info!("Background loops started (poller, period rollover)");

    shutdown_signal().await;

    // --- Shutdown ---
    cancel.cancel();
    if tokio::time::timeout(SHUTDOWN_TIMEOUT, poller_handle).await.is_err() {
        tracing::warn!("Poller did not stop in time");
    }
    if tokio::time::timeout(SHUTDOWN_TIMEOUT, rollover_handle).await.is_err() {
        tracing::warn!("Period rollover did not stop in time");
    }

    match metrics.encode() {
        Ok(text) => tracing::debug!(metrics = %text, "Final metrics"),
        Err(e) => tracing::warn!(error = %e, "Failed to encode metrics"),
    }

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), shutting down");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
