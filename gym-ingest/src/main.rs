//! gym-ingest - bulk loader for the gym database
//!
//! Reads the four CSV exports (membership plans, trainers, members,
//! payments), cleans them, prints a preview of each cleaned table and appends
//! the result to the database in referential order.

use anyhow::{Context, Result};
use clap::Parser;
use gym_common::clean::{clean_all, EntityTables};
use gym_common::config::{RootFolderInitializer, RootFolderResolver, TomlConfig};
use gym_common::db::{init_database, load_batches, truncate_all};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "gym-ingest")]
#[command(about = "Clean gym CSV exports and load them into the database", long_about = None)]
#[command(version)]
struct Args {
    /// Directory the CSV file names are resolved against
    #[arg(long, default_value = ".")]
    input_dir: PathBuf,

    /// Membership plans CSV
    #[arg(long, default_value = "membership_types_dirty.csv")]
    plans: PathBuf,

    /// Trainers CSV (header names are case-insensitive)
    #[arg(long, default_value = "trainer_dirty.csv")]
    trainers: PathBuf,

    /// Members CSV
    #[arg(long, default_value = "members_dirty.csv")]
    members: PathBuf,

    /// Payments CSV
    #[arg(long, default_value = "payments_dirty.csv")]
    payments: PathBuf,

    /// Root folder holding gym.db
    #[arg(long, env = "GYM_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Explicit database file (overrides the root folder)
    #[arg(long)]
    database: Option<PathBuf>,

    /// Clean and preview only; do not touch the database
    #[arg(long)]
    dry_run: bool,

    /// Delete all existing rows before loading
    #[arg(long)]
    truncate: bool,

    /// Rows shown per table in the preview
    #[arg(long, default_value_t = 5)]
    preview_rows: usize,
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
        "Starting gym-ingest v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let resolve = |path: &PathBuf| args.input_dir.join(path);
    let raw = EntityTables::from_files(
        &resolve(&args.plans),
        &resolve(&args.trainers),
        &resolve(&args.members),
        &resolve(&args.payments),
    )
    .context("Failed to read input CSV files")?;

    let batches = clean_all(raw);

    for (title, table) in [
        ("Members", &batches.tables.members),
        ("Trainers", &batches.tables.trainers),
        ("Membership Types", &batches.tables.plans),
        ("Payments", &batches.tables.payments),
    ] {
        println!("{} cleaned ({} rows):\n{}\n", title, table.len(), table.preview(args.preview_rows));
    }
    println!(
        "{}",
        serde_json::to_string_pretty(&batches.report).context("Failed to render report")?
    );

    if args.dry_run {
        info!("Dry run: database left untouched");
        return Ok(());
    }

    let db_path = match &args.database {
        Some(path) => path.clone(),
        None => {
            let root = RootFolderResolver::new()
                .with_cli_arg(args.root_folder.clone())
                .with_toml(config)
                .resolve();
            let initializer = RootFolderInitializer::new(root);
            initializer
                .ensure_directory_exists()
                .context("Failed to create root folder")?;
            initializer.database_path()
        }
    };
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;

    if args.truncate {
        truncate_all(&pool).await.context("Failed to truncate tables")?;
    }

    let summary = load_batches(&pool, &batches)
        .await
        .context("Load aborted; rerun with --truncate to replace existing rows")?;

    info!(
        "Loaded {} rows ({} plans, {} trainers, {} members, {} payments)",
        summary.total(),
        summary.plans,
        summary.trainers,
        summary.members,
        summary.payments
    );

    Ok(())
}
