use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use fast_cli::commands::{correct, delete, history, start, status, stop, timeline};
use fast_cli::{Cli, Commands, Config};

/// Load config, ensuring the database parent directory exists.
fn load_config(cli: &Cli) -> Result<Config> {
    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let mut stdout = std::io::stdout();
    match &cli.command {
        Some(Commands::Start(args)) => {
            let config = load_config(&cli)?;
            start::run(&mut stdout, args, &config, Utc::now())?;
        }
        Some(Commands::Stop) => {
            let config = load_config(&cli)?;
            stop::run(&mut stdout, &config, Utc::now())?;
        }
        Some(Commands::Status { json }) => {
            let config = load_config(&cli)?;
            status::run(&mut stdout, *json, &config, Utc::now())?;
        }
        Some(Commands::Timeline { json }) => {
            let config = load_config(&cli)?;
            timeline::run(&mut stdout, *json, &config, Utc::now())?;
        }
        Some(Commands::History(args)) => {
            let config = load_config(&cli)?;
            history::run(&mut stdout, args, &config)?;
        }
        Some(Commands::Correct(args)) => {
            let config = load_config(&cli)?;
            correct::run(&mut stdout, args, &config)?;
        }
        Some(Commands::Delete { id }) => {
            let config = load_config(&cli)?;
            delete::run(&mut stdout, id, &config)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
