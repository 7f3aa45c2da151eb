// SPDX-FileCopyrightText: 2026 Dropline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dropline - delivery-day SMS notification coordinator.
//!
//! This is the binary entry point for the Dropline service.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use clap::{Parser, Subcommand};

mod serve;
mod shutdown;
mod trigger;

/// Dropline - delivery-day SMS notification coordinator.
#[derive(Parser, Debug)]
#[command(name = "dropline", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Dropline service: webhooks plus the daily scheduler.
    Serve,
    /// Print the effective merged configuration.
    Config,
    /// Force-fire a batch action, sharing the scheduled code paths.
    Trigger {
        #[command(subcommand)]
        batch: trigger::TriggerBatch,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match dropline_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            dropline_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Config) => {
            match toml::to_string_pretty(&config) {
                Ok(rendered) => {
                    println!("{rendered}");
                    Ok(())
                }
                Err(e) => Err(dropline_core::DroplineError::Internal(format!(
                    "failed to render config: {e}"
                ))),
            }
        }
        Some(Commands::Trigger { batch }) => trigger::run_trigger(config, batch).await,
        None => {
            println!("dropline: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
