use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cli;

#[derive(Debug, Parser)]
#[command(name = "hemdash")]
#[command(about = "Home energy management dashboard client")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Interactive terminal dashboard
    Dashboard,
    /// Initialize the system once and print the dashboard
    Init,
    /// Show the persisted session state
    Status {
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Toggle between the light and dark theme
    Theme,
    /// Show recent session activity
    History {
        /// Number of entries to show
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Run the demo backend that answers /api/init
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:8000")]
        addr: String,
        /// JSON file with the homes to serve (built-in sample if omitted)
        #[arg(long)]
        homes: Option<PathBuf>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Write a default ~/.hemdash/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a value, e.g. `hemdash config set api.base_url http://host:8000`
    Set { key: String, value: String },
    /// Reset the global config to defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();

    let loaded = hemdash::config::load_reporting();
    let level = loaded.config.logging.level.as_str();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
    for warning in &loaded.warnings {
        log::warn!("{warning}");
    }
    let cfg = loaded.config;

    match app.command {
        Commands::Dashboard => cli::run_dashboard(&cfg),
        Commands::Init => cli::run_init(&cfg),
        Commands::Status { format } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_status(&cfg, fmt)
        }
        Commands::Theme => cli::run_theme(&cfg),
        Commands::History { limit } => cli::run_history(&cfg, limit),
        Commands::Serve { addr, homes } => cli::run_serve(&addr, homes.as_deref()),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
