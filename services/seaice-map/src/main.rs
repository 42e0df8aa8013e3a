//! Sea-ice map generator.
//!
//! Renders the CryoSat-SMOS thickness or thickness anomaly map for one day
//! and writes it as a PNG, reusing previously rendered maps from the cache.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use seaice_common::{parse_map_date, DisplayMode};
use seaice_map::{AppConfig, MapService};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "seaice-map")]
#[command(about = "Render CryoSat-SMOS sea-ice thickness and anomaly maps")]
struct Args {
    /// Map date (YYYY-MM-DD)
    #[arg(short, long)]
    date: String,

    /// thickness or anomaly
    #[arg(short, long, default_value = "thickness", value_parser = parse_mode)]
    mode: DisplayMode,

    /// Configuration file path
    #[arg(short, long, env = "SEAICE_CONFIG")]
    config: Option<PathBuf>,

    /// Output PNG path (default: the cache file name in the current directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log level
    #[arg(long, env = "SEAICE_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Ignore any cached map and render again
    #[arg(long)]
    no_cache: bool,
}

fn parse_mode(s: &str) -> Result<DisplayMode, String> {
    DisplayMode::parse(s).ok_or_else(|| format!("unknown mode '{}', expected thickness or anomaly", s))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);
    if args.json_logs {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    let date = parse_map_date(&args.date)?;

    let config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::from_env()?,
    };
    let archive = config
        .archive
        .http_url
        .clone()
        .unwrap_or_else(|| config.archive.root.display().to_string());
    info!(
        config = ?args.config,
        archive = %archive,
        cache = config.cache.enabled,
        "Loaded configuration"
    );

    let service = MapService::from_config(&config)?;
    let outcome = service.map(date, args.mode, args.no_cache).await?;

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(outcome.key.file_name()));
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    tokio::fs::write(&output, &outcome.png)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!(
        path = %output.display(),
        bytes = outcome.png.len(),
        cached = outcome.cached,
        revision = ?outcome.revision,
        "Map written"
    );

    Ok(())
}
