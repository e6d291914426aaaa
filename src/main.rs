// src/main.rs

//! nili
//!
//! Entry point for the nili CLI.
//!
//! This binary inspects a project directory, infers which language runtime it
//! belongs to, resolves runnable entrypoints (optionally segmented by roles),
//! and launches the matching subprocess(es). It delegates all real work to
//! the `runner` module.
//!
//! Responsibilities of this file:
//! - Parse CLI arguments
//! - Initialise logging and the async runtime
//! - Convert the runner's Result into the one process exit
//!
//! There is intentionally *no business logic* here; this is also the only
//! place in the crate allowed to terminate the process.

mod cli;
mod config;
mod detect;
mod entrypoint;
mod ports;
mod runner;
mod runtime;
mod select;
mod util;

use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Program entry point.
///
/// Uses Tokio because the runner spawns and waits on child processes
/// asynchronously.
#[tokio::main]
async fn main() {
    // Project-local .env may supply PORT / NILI_ENTRYPOINT.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let cli = cli::Cli::parse();

    let code = match runner::run(cli, &select::TtySelector).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("[nili] {:#}", e);
            1
        }
    };

    std::process::exit(code);
}
