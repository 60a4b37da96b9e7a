//! Mimir Control - CLI entry point.
//!
//! Loads configuration, assembles the resolver, and hands off to either
//! the interactive loop or a one-shot query.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use mimir_core::{Config, Resolver};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mimirctl")]
#[command(about = "Mimir - offline question answering assistant", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive session (the default)
    Repl,

    /// Resolve a single utterance and exit
    Ask {
        /// The utterance to resolve
        #[arg(required = true)]
        utterance: Vec<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let resolver = Resolver::from_config(&config)?;

    match cli.command {
        Some(Commands::Ask { utterance }) => {
            println!("{}", resolver.resolve(&utterance.join(" ")));
            Ok(())
        }
        Some(Commands::Repl) | None => mimirctl::repl::run(&resolver),
    }
}
