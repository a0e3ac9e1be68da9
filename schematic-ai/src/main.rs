//! schematic-ai - Smart Schematic analysis service

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use schematic_ai::jobs::spawn_job_reaper;
use schematic_ai::pipeline::PlaceholderStages;
use schematic_ai::{build_router, AppState, ServiceSettings};
use schematic_common::config::TomlConfig;

/// How often finished jobs are checked for eviction
const JOB_REAPER_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Parser, Debug)]
#[command(name = "schematic-ai")]
#[command(about = "Smart Schematic analysis service")]
#[command(version)]
struct Args {
    /// Configuration file (defaults to the platform config directory)
    #[arg(short, long, env = "SCHEMATIC_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "SCHEMATIC_AI_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on (overrides `[ai_service] port`)
    #[arg(short, long, env = "SCHEMATIC_AI_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().unwrap_or_else(TomlConfig::default_path);
    let (config, config_error) = match TomlConfig::load(&config_path) {
        Ok(config) => (config, None),
        Err(e) => (TomlConfig::default(), Some(e)),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{},tower_http=info", config.logging.level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Smart Schematic AI service (schematic-ai) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    if let Some(e) = config_error {
        error!("Failed to load {}: {}", config_path.display(), e);
        return Err(e).context("Invalid configuration file");
    }

    let ai_config = config.ai_service;
    let allowed_origin = HeaderValue::from_str(&ai_config.allowed_origin)
        .with_context(|| format!("Invalid allowed origin: {}", ai_config.allowed_origin))?;
    info!("CORS allowed origin: {}", ai_config.allowed_origin);

    let settings = ServiceSettings {
        stage_delay: Duration::from_millis(ai_config.stage_delay_ms),
        allowed_origin,
        job_retention: Duration::from_secs(ai_config.job_retention_secs),
    };
    let state = AppState::new(Arc::new(PlaceholderStages), settings)
        .context("Failed to build callback HTTP client")?;

    let reaper = spawn_job_reaper(
        state.jobs.clone(),
        state.settings.job_retention,
        JOB_REAPER_INTERVAL,
    );
    let app = build_router(state);

    let port = args.port.unwrap_or(ai_config.port);
    let listener = tokio::net::TcpListener::bind((args.host.as_str(), port))
        .await
        .with_context(|| format!("Failed to bind to {}:{}", args.host, port))?;
    let addr = listener.local_addr()?;
    info!("schematic-ai listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    reaper.abort();
    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}
