mod config;
mod http;
mod logging;
mod shutdown;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use ridehub::{DatabaseSettings, RideHub};
use tokio_util::sync::CancellationToken;

use crate::config::{AppConfig, CliOverrides};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// RideHub Server - cycling communities, chapters and group rides
#[derive(Parser)]
#[command(name = "ridehub-server")]
#[command(about = "RideHub Server - cycling communities, chapters and group rides")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port override for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print effective configuration (YAML) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory SQLite database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Validate configuration and exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) defaults -> 2) YAML (if provided) -> 3) env (RIDEHUB__*) -> 4) CLI overrides
    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli_overrides(CliOverrides {
        port: cli.port,
        verbose: cli.verbose,
        mock: cli.mock,
    });

    if cli.print_config {
        println!("Effective configuration:\n{}", config.to_yaml()?);
        return Ok(());
    }

    logging::init(&config.logging)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "RideHub Server starting");

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(&config),
    }
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    config.validate()?;
    println!("Configuration is valid");
    println!("{}", config.to_yaml()?);
    Ok(())
}

async fn run_server(config: AppConfig) -> Result<()> {
    config.validate()?;
    let addr = config.socket_addr()?;

    let database = DatabaseSettings {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
    };
    let app = RideHub::init(&config.ridehub, &database).await?;

    let cancel = CancellationToken::new();
    shutdown::cancel_on_signal(cancel.clone());
    let sync_task = app.spawn_periodic_sync(cancel.child_token());

    let router = http::apply_layers(app.router(), &config.server);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("HTTP server bound on {}", addr);

    let graceful = {
        let cancel = cancel.clone();
        async move {
            cancel.cancelled().await;
            tracing::info!("HTTP server shutting down gracefully (cancellation)");
        }
    };
    let served = axum::serve(listener, router)
        .with_graceful_shutdown(graceful)
        .await
        .context("HTTP server failed");

    cancel.cancel();
    if let Some(task) = sync_task {
        if let Err(e) = task.await {
            tracing::warn!(error = %e, "Periodic sync task ended abnormally");
        }
    }
    tracing::info!("RideHub Server stopped");
    served
}
