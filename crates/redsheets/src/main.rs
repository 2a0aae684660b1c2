//! `redsheets` - CLI for the Cyberpunk RED sheet server
//!
//! This binary runs the web server and offers offline access to the stored
//! collections.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use redsheets::cli::{Cli, Command, ConfigCommand, ExportCommand, ListCommand, ServeCommand};
use redsheets::{build_router_with_limit, build_state, init_logging, Config, Kind, RecordId};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity(), cli.log_output());

    match cli.command {
        Command::Serve(serve_cmd) => handle_serve(load_config(cli.config)?, serve_cmd).await,
        Command::List(list_cmd) => handle_list(&load_config(cli.config)?, &list_cmd),
        Command::Export(export_cmd) => handle_export(&load_config(cli.config)?, &export_cmd).await,
        Command::Config(config_cmd) => handle_config(cli.config, config_cmd),
    }
}

fn load_config(path: Option<PathBuf>) -> Result<Config> {
    Config::load_from(path).context("failed to load configuration")
}

async fn handle_serve(mut config: Config, cmd: ServeCommand) -> Result<()> {
    if let Some(bind) = cmd.bind {
        config.server.bind = bind.to_string();
    }
    if let Some(data_dir) = cmd.data_dir {
        config.storage.data_dir = Some(data_dir);
    }

    let addr = config.bind_addr()?;
    let state = build_state(&config).context("failed to initialise application")?;
    if !state.renderer.is_available() {
        info!("Serving without PDF export");
    }
    let app = build_router_with_limit(state, config.server.max_body_bytes);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(
        "Listening on http://{} (data in {})",
        listener.local_addr()?,
        config.data_dir().display()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .context("server failed")?;
    info!("Server stopped");
    Ok(())
}

async fn wait_for_shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}

fn handle_list(config: &Config, cmd: &ListCommand) -> Result<()> {
    let kind = Kind::from(cmd.kind);
    let state = build_state(config)?;
    let records = state.services.get(kind).list()?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    println!("{} ({})", kind.title(), records.len());
    for record in &records {
        println!(
            "{:>5}  {:<32}  {}",
            record.id_text().unwrap_or_default(),
            record.label(),
            record.created_at().unwrap_or("-")
        );
    }
    Ok(())
}

async fn handle_export(config: &Config, cmd: &ExportCommand) -> Result<()> {
    let kind = Kind::from(cmd.kind);
    let state = build_state(config)?;
    if !state.renderer.is_available() {
        bail!("wkhtmltopdf was not found; set renderer.wkhtmltopdf_path");
    }

    let record = state.services.get(kind).require(&RecordId::Number(cmd.id))?;
    let pdf = state.renderer.render(kind, &record).await?;

    let path = cmd.output_path();
    std::fs::write(&path, &pdf).with_context(|| format!("failed to write {}", path.display()))?;
    println!("Wrote {} ({} bytes)", path.display(), pdf.len());
    Ok(())
}

fn handle_config(config_path: Option<PathBuf>, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = Config::load_from(config_path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Server]");
                println!("  Bind:               {}", config.server.bind);
                println!("  Max body (bytes):   {}", config.server.max_body_bytes);
                println!();
                println!("[Storage]");
                println!("  Data directory:     {}", config.data_dir().display());
                println!();
                println!("[Renderer]");
                println!("  Enabled:            {}", config.renderer.enabled);
                println!(
                    "  wkhtmltopdf:        {}",
                    config
                        .renderer
                        .wkhtmltopdf_path
                        .as_ref()
                        .map_or_else(|| "(search)".to_string(), |p| p.display().to_string())
                );
                println!("  Timeout (secs):     {}", config.renderer.timeout_secs);
                println!(
                    "  Templates:          {}",
                    config
                        .renderer
                        .templates_dir
                        .as_ref()
                        .map_or_else(|| "(built-in)".to_string(), |p| p.display().to_string())
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.or(config_path).unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
