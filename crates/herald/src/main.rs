// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Herald - a mini CRM with rule-based segments and campaign delivery.
//!
//! This is the binary entry point for the herald server.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use clap::{Parser, Subcommand};
use herald_config::model::HeraldConfig;
use herald_core::HeraldError;

mod seed;
mod serve;

/// Herald - a mini CRM with rule-based segments and campaign delivery.
#[derive(Parser, Debug)]
#[command(name = "herald", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the herald API server and delivery workers.
    Serve,
    /// Insert sample customers and orders into the database.
    Seed,
    /// Print the effective configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup
    let config = match herald_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            herald_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Seed) => seed::run_seed(config).await,
        Some(Commands::Config) => print_config(&config),
        None => {
            println!("herald: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Renders the effective configuration as TOML with secrets redacted.
fn print_config(config: &HeraldConfig) -> Result<(), HeraldError> {
    let rendered = toml::to_string_pretty(&redact(config))
        .map_err(|e| HeraldError::Internal(format!("failed to render config: {e}")))?;
    print!("{rendered}");
    Ok(())
}

fn redact(config: &HeraldConfig) -> HeraldConfig {
    let mut shown = config.clone();
    if shown.server.bearer_token.is_some() {
        shown.server.bearer_token = Some("[redacted]".to_string());
    }
    if shown.assist.api_key.is_some() {
        shown.assist.api_key = Some("[redacted]".to_string());
    }
    shown
}
