use anyhow::Result;
use clap::Parser;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use refcache::config::Config;
use refcache::mock_data::seed_demo_data;
use refcache::state::{AppState, BaseRepositories};

/// refcache - Cache-aside layer for ERP master data
#[derive(Parser, Debug)]
#[command(name = "refcache")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Skip the startup warm-up regardless of CACHE_WARM_ON_STARTUP
    #[arg(long)]
    skip_warm: bool,

    /// Warm once, print cache statistics and exit
    #[arg(long)]
    once: bool,

    /// Redis connection URL
    #[cfg(feature = "redis")]
    #[arg(long, env = "REDIS_URL")]
    redis_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "refcache=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    #[cfg(feature = "redis")]
    let config = match cli.redis_url.clone() {
        Some(redis_url) => Config { redis_url, ..config },
        None => config,
    };
    tracing::debug!(?config, "Loaded configuration");

    let base = BaseRepositories::default();
    let counts = seed_demo_data(&base).await?;
    tracing::info!(?counts, "Base repositories ready");

    let state = AppState::new(base, &config).await?;
    state.start_sweeper(config.sweep_interval());

    if config.warm_on_startup && !cli.skip_warm {
        let summary = state.manager.warm_all_caches().await;
        if !summary.is_complete() {
            tracing::warn!(failures = summary.failures.len(), "Cache warm-up was partial");
        }
    }

    if !cli.once {
        refresh_until_shutdown(&state, &config).await;
    }

    let stats = state.stats.snapshot();
    tracing::info!(
        hits = stats.hits,
        misses = stats.misses,
        read_failures = stats.read_failures,
        write_failures = stats.write_failures,
        bypasses = stats.bypasses,
        hit_ratio = stats.hit_ratio(),
        "Cache statistics"
    );

    state.manager.invalidate_all_caches().await;
    state.stop_sweeper().await;

    tracing::info!("Stopped");
    Ok(())
}

/// Periodically refreshes the hottest reference tables until a shutdown
/// signal arrives.
async fn refresh_until_shutdown(state: &AppState, config: &Config) {
    let mut ticker = tokio::time::interval(config.refresh_interval());
    // The first tick completes immediately
    ticker.tick().await;

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                state.manager.warm_frequently_accessed_data().await;
            }
            _ = &mut shutdown => break,
        }
    }
}

/// Wait for shutdown signals (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }
}
