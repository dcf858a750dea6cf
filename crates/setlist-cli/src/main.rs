mod console;
mod serve;
mod songs;
mod telemetry;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use setlistconf::SetlistConfig;

/// Operator console for live singing broadcasts
#[derive(Parser, Debug)]
#[command(name = "setlist-cli", version, about, long_about = None)]
struct Cli {
    /// Config file layered over the system and user configs
    /// (replaces ./setlist.toml)
    #[arg(short, long, global = true, env = "SETLIST_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a session: read operator commands from stdin and keep the overlay page current
    Serve,

    /// Manage the song catalog
    #[command(subcommand)]
    Song(songs::SongCommand),

    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the effective configuration as TOML
    Show {
        /// Also list the files and environment variables that contributed
        #[arg(long)]
        sources: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, loaded_from) = SetlistConfig::load_with_sources_from(cli.config.as_deref())
        .context("Failed to load configuration")?;
    telemetry::init(&config.telemetry.log_level);
    tracing::debug!(
        files = ?loaded_from.files,
        env = ?loaded_from.env_overrides,
        "Configuration loaded"
    );

    match cli.command {
        Commands::Serve => serve::run(&config).await,
        Commands::Song(command) => songs::run(command, &config),
        Commands::Config(ConfigCommand::Show { sources }) => {
            print!("{}", config.to_toml()?);
            if sources {
                println!();
                for file in &loaded_from.files {
                    println!("# file: {}", file.display());
                }
                for var in &loaded_from.env_overrides {
                    println!("# env: {var}");
                }
            }
            Ok(())
        }
    }
}
