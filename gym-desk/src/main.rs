//! gym-desk - staff console service
//!
//! Serves the front-desk JSON API over the shared gym database.

use anyhow::{Context, Result};
use clap::Parser;
use gym_common::config::{RootFolderInitializer, RootFolderResolver, TomlConfig};
use gym_common::db::{init_database, SqliteStore};
use gym_desk::{build_router, AppState};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "gym-desk")]
#[command(about = "Gym staff console service", long_about = None)]
#[command(version)]
struct Args {
    /// Root folder holding gym.db
    #[arg(long, env = "GYM_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// HTTP port (defaults to desk_port from the config file, then 5810)
    #[arg(long, env = "GYM_DESK_PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    bind: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = TomlConfig::load_or_default();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .init();

    info!(
        "Starting gym-desk v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let port = args.port.unwrap_or(config.desk_port);

    let root_folder = RootFolderResolver::new()
        .with_cli_arg(args.root_folder)
        .with_toml(config)
        .resolve();
    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .context("Failed to create root folder")?;

    let db_path = initializer.database_path();
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;

    let state = AppState::new(Arc::new(SqliteStore::new(pool)));
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", args.bind, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", args.bind, port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("gym-desk listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
