//! Start command - launches the notes API server.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Args;
use tracing::{info, warn};

use notes_config::LoadedConfig;
use notes_server::{Server, ServerConfig};
use notes_store::NoteStore;

use super::Context;

/// Arguments for the start command.
///
/// CLI arguments override config file values.
#[derive(Args, Debug, Default)]
pub struct StartArgs {
    /// Port to listen on (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address or hostname to bind to (overrides config)
    #[arg(short, long)]
    pub bind: Option<String>,

    /// JSON file to persist notes to (overrides config)
    #[arg(long)]
    pub data_file: Option<PathBuf>,

    /// Path to config file (overrides default discovery)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Run the start command.
pub async fn run(args: StartArgs, ctx: &Context) -> Result<()> {
    // ── Load configuration ──────────────────────────────────────────────

    let loaded = match args.config {
        Some(ref config_path) => {
            let config = notes_config::load_config_file(config_path)?;
            LoadedConfig::from_file(config, config_path)
        }
        None => notes_config::load_config(None)?,
    };

    for warning in &loaded.warnings {
        eprintln!("warning: {}", warning);
    }

    if ctx.verbose {
        let sources = loaded.loaded_from();
        if sources.is_empty() {
            println!("No config files found, using defaults + CLI args");
        } else {
            for source in sources {
                println!("Loaded config: {}", source.display());
            }
        }
    }

    let server_config = resolve_server_config(&loaded.config.server(), &args).await?;
    let data_file = args
        .data_file
        .clone()
        .unwrap_or_else(|| loaded.config.store().path);

    // ── Open the store ──────────────────────────────────────────────────

    let store = {
        let path = data_file.clone();
        tokio::task::spawn_blocking(move || NoteStore::open(path))
            .await
            .context("opening note store")?
    };
    info!(path = %data_file.display(), notes = store.len(), "Note store ready");

    // ── Serve ───────────────────────────────────────────────────────────

    let addr = server_config.bind_address;
    println!("Notes API listening on http://{}", addr);
    if ctx.verbose {
        println!("Data file: {}", data_file.display());
        println!("Docs: http://{}/docs", addr);
    }

    Server::new(Arc::new(store), server_config)
        .run_with_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Merge the `[server]` section with CLI overrides.
async fn resolve_server_config(
    file: &notes_config::ServerConfig,
    args: &StartArgs,
) -> Result<ServerConfig> {
    let bind = args.bind.as_deref().unwrap_or(&file.bind);
    let port = args.port.unwrap_or(file.port);
    let addr = resolve_bind_address(bind, port).await?;

    Ok(ServerConfig::new()
        .with_bind_address(addr)
        .with_request_logging(file.request_logging)
        .with_cors_origins(file.cors_origins.clone())
        .with_max_body_size(file.max_body_size))
}

/// IP literals are used as-is; anything else is resolved and the first
/// address wins.
async fn resolve_bind_address(bind: &str, port: u16) -> Result<SocketAddr> {
    if let Ok(ip) = bind.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, port));
    }

    let mut addrs = tokio::net::lookup_host((bind, port))
        .await
        .with_context(|| format!("invalid bind address '{}'", bind))?;
    addrs
        .next()
        .with_context(|| format!("invalid bind address '{}': no addresses found", bind))
}

/// Resolves on Ctrl-C.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received, draining connections"),
        Err(e) => {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
