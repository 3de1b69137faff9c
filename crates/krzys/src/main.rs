// SPDX-FileCopyrightText: 2026 Krzys Comm Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Krzys Comm - a small state and messaging log service.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod inspect;
mod serve;
mod shutdown;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use krzys_config::model::KrzysConfig;

/// Krzys Comm - status record and message log over HTTP.
#[derive(Parser, Debug)]
#[command(name = "krzys", version, about, long_about = None)]
struct Cli {
    /// Load this config file instead of the default hierarchy.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP server (default).
    Serve,
    /// Print the current status record as JSON.
    State,
    /// Print history entries as JSON, newest first.
    History {
        /// Maximum number of entries.
        #[arg(long)]
        limit: Option<i64>,
        /// Only entries of this kind (`state` or `comm`).
        #[arg(long)]
        kind: Option<String>,
    },
    /// Print the effective configuration as TOML.
    Config,
}

fn load_config(path: Option<&Path>) -> KrzysConfig {
    let loaded = match path {
        Some(path) => krzys_config::load_and_validate_path(path),
        None => krzys_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            krzys_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    let result = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve::run_serve(config).await,
        Commands::State => {
            serve::init_tracing("warn");
            inspect::state_json(&config).await.map(|out| println!("{out}"))
        }
        Commands::History { limit, kind } => {
            serve::init_tracing("warn");
            inspect::history_json(&config, limit, kind.as_deref())
                .await
                .map(|out| println!("{out}"))
        }
        Commands::Config => inspect::config_toml(&config).map(|out| print!("{out}")),
    };

    if let Err(e) = result {
        eprintln!("krzys: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Verify jemalloc is the global allocator by advancing the epoch.
        // Only jemalloc supports this -- the system allocator would fail.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["krzys"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn history_flags_parse() {
        let cli = Cli::try_parse_from([
            "krzys", "history", "--limit", "5", "--kind", "comm", "--config", "/tmp/k.toml",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::History { limit, kind }) => {
                assert_eq!(limit, Some(5));
                assert_eq!(kind.as_deref(), Some("comm"));
            }
            other => panic!("expected history, got {other:?}"),
        }
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/k.toml")));
    }
}
