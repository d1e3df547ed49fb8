//! OneGeo - LAS well-log ingestion and interpretation service
//!
//! # Usage
//!
//! ```bash
//! # Run the HTTP API (default command)
//! onegeo serve --addr 0.0.0.0:8000
//!
//! # One-off operations against the same data directory
//! onegeo ingest logs/north7.las
//! onegeo wells
//! onegeo curves 1
//! onegeo interpret 2 1000 1500
//!
//! # Throwaway in-memory instance
//! onegeo --ephemeral serve
//! ```
//!
//! # Environment Variables
//!
//! - `ONEGEO_CONFIG`: Path to a TOML config file
//! - `ONEGEO_BIND_ADDRESS`, `ONEGEO_DATA_DIR`, `ONEGEO_ARCHIVE_URL`,
//!   `ONEGEO_ARCHIVE_TOKEN`: override config values
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use onegeo::api::{create_app, AppState};
use onegeo::config::AppConfig;
use onegeo::services::Services;
use onegeo::types::EntityId;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "onegeo")]
#[command(about = "OneGeo well-log ingestion and interpretation service")]
#[command(version)]
struct CliArgs {
    /// Path to a TOML config file (overrides ONEGEO_CONFIG and ./onegeo.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Keep wells and raw files in memory; nothing is written to disk
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Option<SubCommand>,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Run the HTTP API
    Serve {
        /// Override the bind address (default from config: "0.0.0.0:8000")
        #[arg(short, long, value_name = "HOST:PORT")]
        addr: Option<String>,
    },

    /// Ingest one LAS file and print the outcome
    Ingest {
        file: PathBuf,
    },

    /// List ingested wells
    Wells,

    /// List the curves of a well
    Curves {
        well_id: EntityId,
    },

    /// Interpret a curve over an inclusive depth window
    Interpret {
        curve_id: EntityId,
        #[arg(allow_negative_numbers = true)]
        min_depth: f64,
        #[arg(allow_negative_numbers = true)]
        max_depth: f64,
    },
}

// ============================================================================
// Commands
// ============================================================================

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // stdout is reserved for command output
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn serve(config: &AppConfig, services: &Services, addr: Option<String>) -> Result<()> {
    let bind_address = addr.unwrap_or_else(|| config.server.bind_address.clone());
    let app = create_app(AppState::new(services), &config.server);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {bind_address}"))?;
    info!(
        addr = %bind_address,
        storage = services.store.backend_name(),
        archive = services.archive.backend_name(),
        "OneGeo API listening"
    );

    // Graceful shutdown via Ctrl+C
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received Ctrl+C, initiating shutdown...");
        shutdown_token.cancel();
    });

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            cancel_token.cancelled().await;
        })
        .await;

    match result {
        Ok(()) => info!("Graceful shutdown complete"),
        Err(e) => {
            error!(error = %e, "HTTP server error");
            return Err(anyhow::anyhow!("HTTP server error: {e}"));
        }
    }
    Ok(())
}

async fn ingest(services: &Services, file: PathBuf) -> Result<()> {
    let filename = file
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("Not a file path: {}", file.display()))?
        .to_string();
    let content = tokio::fs::read(&file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let outcome = services.pipeline().ingest(&filename, content).await?;
    print_json(&outcome)
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let args = CliArgs::parse();
    init_tracing(args.log_json);

    let mut config = AppConfig::load(args.config.as_deref())?;
    if args.ephemeral {
        config.storage.ephemeral = true;
    }

    let services = Services::open(&config)?;
    let command = args.command.unwrap_or(SubCommand::Serve { addr: None });

    let result = match command {
        SubCommand::Serve { addr } => serve(&config, &services, addr).await,
        SubCommand::Ingest { file } => ingest(&services, file).await,
        SubCommand::Wells => print_json(&services.catalog().list_wells()?),
        SubCommand::Curves { well_id } => print_json(&services.catalog().list_curves(well_id)?),
        SubCommand::Interpret {
            curve_id,
            min_depth,
            max_depth,
        } => print_json(&services.engine().interpret(curve_id, min_depth, max_depth)?),
    };

    services.flush().context("Failed to flush well database")?;
    result
}
