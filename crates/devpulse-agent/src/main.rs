mod cli;
mod config;
mod error;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use devpulse_core::{
    FetchError, Harvester, HarvestMetrics, PageFetcher, ReqwestHttpClient, ShutdownHandle,
    Warehouse, WarehouseConfig,
};

use crate::cli::Cli;
use crate::config::AgentConfig;
use crate::error::AgentError;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(error) = run().await {
        tracing::error!(%error, "agent failed");
        eprintln!("error: {error}");
        std::process::exit(error.exit_code());
    }
}

async fn run() -> Result<(), AgentError> {
    let cli = Cli::parse();
    let config = AgentConfig::load(&cli.config)?;
    tracing::info!(
        repos = config.sources.repos.len(),
        tags = config.sources.tags.len(),
        db = %cli.db.display(),
        "configuration loaded"
    );

    let warehouse = Warehouse::open(WarehouseConfig::at(&cli.db))?;
    let metrics = HarvestMetrics::shared()?;
    let shutdown = ShutdownHandle::new();

    let listener = TcpListener::bind(&cli.listen).await?;
    tokio::spawn(devpulse_web::serve(
        listener,
        Arc::clone(&metrics),
        shutdown.clone(),
    ));

    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown signal received");
            signal_shutdown.request();
        }
    });

    let fetcher = PageFetcher::new(Arc::new(ReqwestHttpClient::new())).with_shutdown(shutdown.clone());
    let harvester = Harvester::new(fetcher, Arc::clone(&metrics), warehouse, config.credentials);

    let interval = Duration::from_secs(cli.interval_hours.saturating_mul(3600));
    loop {
        tracing::info!("starting harvest cycle");
        match harvester.run_cycle(&config.sources).await {
            Ok(()) => tracing::info!("harvest cycle complete"),
            Err(FetchError::Cancelled) => {
                tracing::info!("harvest cycle cancelled by shutdown");
                break;
            }
            Err(error) => tracing::error!(%error, "harvest cycle failed"),
        }

        if cli.once || shutdown.is_requested() {
            break;
        }

        tokio::select! {
            () = shutdown.wait() => break,
            () = tokio::time::sleep(interval) => {}
        }
    }

    // Release the web server's graceful-shutdown wait as well.
    shutdown.request();
    Ok(())
}
