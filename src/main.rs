use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use commands::{
    AccountCommand, ConfigCommand, CustomCommand, FoodCommand, GoalCommand, LogCommand,
};
use config::Config;
use macromate_core::{DataManager, LoadOutcome};

#[derive(Parser)]
#[command(name = "macromate")]
#[command(version)]
#[command(about = "Track calories and macros from the command line", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Register, log in and manage your account
    Account(AccountCommand),

    /// Browse and extend the food catalog
    Food(FoodCommand),

    /// Manage your custom foods
    Custom(CustomCommand),

    /// Log what you ate and review days and weeks
    Log(LogCommand),

    /// Set and check nutrition goals
    Goal(GoalCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = Config::load(cli.config)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.value.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let command = match cli.command {
        Some(Commands::Config(cmd)) => return cmd.run(&config),
        Some(command) => command,
        None => {
            println!("Use --help to see available commands");
            return Ok(());
        }
    };

    tracing::debug!("Data directory: {}", config.data_dir.value.display());
    if let Some(path) = &config.config_file {
        tracing::debug!("Config file: {}", path.display());
    }

    let (mut manager, outcome) = DataManager::open(config.data_dir.value.clone());
    if let LoadOutcome::Recovered(reason) = &outcome {
        eprintln!("Warning: could not read saved data, starting fresh ({})", reason);
    }

    match command {
        Commands::Account(cmd) => cmd.run(&mut manager),
        Commands::Food(cmd) => cmd.run(&mut manager),
        Commands::Custom(cmd) => cmd.run(&mut manager),
        Commands::Log(cmd) => cmd.run(&mut manager),
        Commands::Goal(cmd) => cmd.run(&mut manager),
        Commands::Config(cmd) => cmd.run(&config),
    }
}
