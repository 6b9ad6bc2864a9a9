#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the violations dashboard server.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use violations_dashboard_server::config::ServerConfig;
use violations_dashboard_server::{ServerError, interactive, run_server};

#[derive(Parser)]
#[command(
    name = "violations_dashboard_server",
    about = "Violations dashboard API server"
)]
struct Cli {
    /// Path to a TOML config file (overrides `DASHBOARD_CONFIG`)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Address to bind to
    #[arg(long)]
    bind_addr: Option<String>,
    /// Port to listen on
    #[arg(long)]
    port: Option<u16>,
    /// CSV file for the primary dataset
    #[arg(long)]
    primary_csv: Option<PathBuf>,
    /// CSV file for the validated-subset dataset
    #[arg(long)]
    validated_csv: Option<PathBuf>,
    /// Directory of front-end files to serve at `/`
    #[arg(long)]
    static_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server (default)
    Serve,
    /// Prompt for bind address and port, then start the server
    Interactive,
}

impl Cli {
    fn into_config(self) -> Result<(ServerConfig, Option<Commands>), ServerError> {
        let mut config = ServerConfig::load(self.config.as_deref())?;

        if let Some(addr) = self.bind_addr {
            config.bind_addr = addr;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(path) = self.primary_csv {
            config.primary_csv = path;
        }
        if let Some(path) = self.validated_csv {
            config.validated_csv = path;
        }
        if self.static_dir.is_some() {
            config.static_dir = self.static_dir;
        }

        Ok((config, self.command))
    }
}

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let (config, command) = Cli::parse().into_config()?;

    let result = match command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server(config).await,
        Commands::Interactive => interactive::run(config).await,
    };

    if let Err(e) = &result {
        log::error!("{e}");
    }

    Ok(result?)
}
