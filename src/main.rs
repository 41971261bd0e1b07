//! Vulnscope CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "vulnscope")]
#[command(about = "Per-file vulnerability analysis cache for manifest dependencies", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Cache configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze the dependencies of a manifest file
    Analyze {
        /// Analysis provider to use
        #[arg(long, default_value = "fixture")]
        provider: String,

        /// JSON file of recorded reports, keyed by manifest path
        #[arg(long)]
        fixture: Option<PathBuf>,

        /// Package manager of the manifest (npm, maven, pypi, golang, ...)
        #[arg(short, long)]
        package_manager: String,

        /// Path of the manifest file
        #[arg(short, long)]
        file: String,

        /// Package URLs of the declared dependencies
        #[arg(required = true)]
        dependencies: Vec<String>,
    },
    /// Print the effective cache configuration
    Config,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "vulnscope={log_level},vulnscope_core={log_level},vulnscope_analysis={log_level}"
        )))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze {
            provider,
            fixture,
            package_manager,
            file,
            dependencies,
        } => {
            commands::analyze(
                &config,
                &provider,
                fixture.as_deref(),
                &package_manager,
                &file,
                &dependencies,
            )
            .await
        }
        Commands::Config => commands::show_config(&config),
        Commands::Version => {
            println!("Vulnscope v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
