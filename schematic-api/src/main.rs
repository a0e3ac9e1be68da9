//! schematic-api - Smart Schematic web API server

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use schematic_api::ai_client::AiClient;
use schematic_api::storage::S3Store;
use schematic_api::{build_router, ApiSettings, AppState};
use schematic_common::config::{RootFolderInitializer, RootFolderResolver, TomlConfig};
use schematic_common::db::init_database;

#[derive(Parser, Debug)]
#[command(name = "schematic-api")]
#[command(about = "Smart Schematic web API")]
#[command(version)]
struct Args {
    /// Configuration file (defaults to the platform config directory)
    #[arg(short, long, env = "SCHEMATIC_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "SCHEMATIC_API_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "SCHEMATIC_API_PORT")]
    port: Option<u16>,

    /// Data folder holding the database
    #[arg(short, long)]
    root_folder: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().unwrap_or_else(TomlConfig::default_path);
    // Logging is not up yet, so a bad file is reported once it is
    let (config, config_error) = match TomlConfig::load(&config_path) {
        Ok(config) => (config, None),
        Err(e) => (TomlConfig::default(), Some(e)),
    };
    let config = config.apply_env();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{},tower_http=info", config.logging.level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Smart Schematic API (schematic-api) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    if let Some(e) = config_error {
        error!("Failed to load {}: {}", config_path.display(), e);
        return Err(e).context("Invalid configuration file");
    }

    let root_folder = match args.root_folder {
        Some(path) => path,
        None => RootFolderResolver::new("schematic-api")
            .with_toml_root(config.root_folder.clone())
            .resolve(),
    };
    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .context("Failed to create root folder")?;

    let db_path = initializer.database_path();
    info!("Database path: {}", db_path.display());
    let pool = init_database(&db_path)
        .await
        .context("Failed to initialize database")?;
    info!("✓ Database ready");

    let store = S3Store::new(&config.storage).context("Invalid storage configuration")?;
    if config.storage.access_key_id.is_empty() {
        warn!("S3 access key is empty; presigned URLs will be rejected by storage");
    }

    let ai = AiClient::new(config.ai_service.base_url()).context("Failed to build AI client")?;
    let use_mock = config.ai_service.use_mock();
    if use_mock {
        info!("Processing in mock mode (AI service URL is the local default)");
    } else if ai.check_health().await {
        info!("✓ AI service reachable at {}", ai.base_url());
    } else {
        warn!("AI service at {} is not responding", ai.base_url());
    }

    let settings = ApiSettings {
        presign_expiry: Duration::from_secs(config.storage.presign_expiry_secs),
        use_mock,
    };
    let state = AppState::new(pool, Arc::new(store), ai, settings);
    let app = build_router(state);

    let host = args.host.unwrap_or(config.server.host);
    let port = args.port.unwrap_or(config.server.port);
    let listener = tokio::net::TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("Failed to bind to {}:{}", host, port))?;
    let addr = listener.local_addr()?;
    info!("schematic-api listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

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
