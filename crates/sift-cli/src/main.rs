use clap::{Parser, Subcommand};
use sift_core::SiftConfig;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "sift", version, about = "Schema index introspection")]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, short, global = true, env = "SIFT_CONFIG", default_value = "sift.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default configuration file.
    Init {
        /// Overwrite an existing configuration file
        #[arg(long, default_value_t = false)]
        force: bool,
    },

    /// Capture a schema snapshot as JSON.
    Snapshot {
        /// Database URL; overrides the configured upstream
        #[arg(long = "database-url", env = "DATABASE_URL")]
        database_url: Option<String>,

        /// Write to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// List indexes with the constraints they back.
    Indexes {
        /// Database URL; overrides the configured upstream
        #[arg(long = "database-url", env = "DATABASE_URL")]
        database_url: Option<String>,

        /// Only show indexes of this table
        #[arg(long)]
        table: Option<String>,

        /// Only show indexes that back no constraint
        #[arg(long, default_value_t = false)]
        standalone: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Command::Init { force } => {
            init_tracing("info");
            commands::init::run(&cli.config, force)?;
        }

        Command::Snapshot {
            database_url,
            output,
        } => {
            let config = load_config(&cli.config)?;
            commands::snapshot::run(&config, database_url.as_deref(), output.as_deref()).await?
        }

        Command::Indexes {
            database_url,
            table,
            standalone,
        } => {
            let config = load_config(&cli.config)?;
            commands::indexes::run(&config, database_url.as_deref(), table.as_deref(), standalone)
                .await?
        }
    }

    Ok(())
}

/// Load the config file and install the log subscriber at its level. A
/// missing file falls back to defaults.
fn load_config(path: &Path) -> anyhow::Result<SiftConfig> {
    if !path.exists() {
        init_tracing(&SiftConfig::default().logging.level);
        tracing::warn!(config = %path.display(), "Config file not found, using defaults");
        return Ok(SiftConfig::default());
    }

    let config = SiftConfig::from_file(path)?;
    init_tracing(&config.logging.level);
    tracing::debug!(config = %path.display(), "Loaded configuration");
    Ok(config)
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
