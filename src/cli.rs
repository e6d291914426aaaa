// src/cli.rs

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// The intelligent local runtime detector and runner.
///
/// `.nili.json` is the source of truth when present.
/// Otherwise nili infers the runtime from marker files.
#[derive(Parser, Debug)]
#[command(
    name = "nili",
    version,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// All supported CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Detect the runtime and run the project.
    ///
    /// Resolution order:
    /// - NILI_ENTRYPOINT environment variable
    /// - roles declared in .nili.json / nili.config.json
    /// - runtime detection + conventional entrypoints
    Run {
        /// Project directory
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        /// Run a single named role, skipping the role prompt
        ///
        /// Example:
        /// --role server
        #[arg(long)]
        role: Option<String>,

        /// Run every resolved role without prompting
        #[arg(long)]
        all: bool,

        /// Path to config file
        ///
        /// Defaults to .nili.json / nili.config.json inside --dir
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Only detect the runtime without running.
    Detect {
        /// Project directory
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
}
