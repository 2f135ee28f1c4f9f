//! Trellis CLI - Main entry point

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "trellis")]
#[command(version)]
#[command(about = "Render splice-based HTML and XML templates", long_about = None)]
struct Cli {
    /// Show debug output (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one template to stdout or a file
    Render {
        /// Template root directory
        root: PathBuf,

        /// Template name (e.g. blog/post)
        name: String,

        /// Write output to FILE
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Template parameter (KEY=VALUE), bound as a text splice
        #[arg(short = 'P', long = "param")]
        params: Vec<String>,

        /// Configuration file (defaults to ROOT/trellis.yml)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Parse every template and report failures
    Check {
        /// Template root directory
        root: PathBuf,

        /// Configuration file (defaults to ROOT/trellis.yml)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List template names
    List {
        /// Template root directory
        root: PathBuf,

        /// Configuration file (defaults to ROOT/trellis.yml)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.verbose { "trellis=debug" } else { "trellis=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Render {
            root,
            name,
            output,
            params,
            config,
        } => commands::render::execute(commands::render::RenderArgs {
            root,
            name,
            output,
            params,
            config,
        }),
        Commands::Check { root, config } => {
            commands::check::execute(commands::check::CheckArgs { root, config })
        }
        Commands::List { root, config } => {
            commands::list::execute(commands::list::ListArgs { root, config })
        }
    }
}
