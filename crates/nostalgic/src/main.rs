// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Nostalgic - backend for retro web widgets.
//!
//! This is the binary entry point: the HTTP server, a one-shot retention
//! sweep, and a configuration check.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use nostalgic_config::{ConfigError, NostalgicConfig};

/// Nostalgic - backend for retro web widgets.
#[derive(Parser, Debug)]
#[command(name = "nostalgic", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP server.
    Serve,
    /// Purge idle widgets and expired markers once, then exit.
    Sweep,
    /// Validate the configuration and exit.
    CheckConfig,
}

fn load(path: Option<&PathBuf>) -> Result<NostalgicConfig, Vec<ConfigError>> {
    match path {
        Some(path) => nostalgic_config::load_and_validate_path(path),
        None => nostalgic_config::load_and_validate(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load(cli.config.as_ref()) {
        Ok(config) => config,
        Err(errors) => {
            nostalgic_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve::run_serve(config).await,
        Commands::Sweep => serve::run_sweep(config).await,
        Commands::CheckConfig => {
            println!(
                "nostalgic: config OK (listening on {}:{}, database {})",
                config.server.host, config.server.port, config.storage.database_path
            );
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("nostalgic: {e}");
        std::process::exit(1);
    }
}
