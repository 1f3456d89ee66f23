//! CLI command implementations for hemdash.
//!
//! Provides subcommand handlers for:
//! - `hemdash dashboard` — interactive terminal dashboard
//! - `hemdash init` — run the initialize flow once
//! - `hemdash status` — show the persisted session state
//! - `hemdash theme` — toggle light/dark
//! - `hemdash history` — recent activity
//! - `hemdash serve` — demo backend for `/api/init`
//! - `hemdash config show|init|set|reset` — configuration management

pub mod dashboard;
pub mod render;

use std::path::Path;
use std::thread;

use anyhow::{Context, Result};
use colored::Colorize;
use hemdash::activity;
use hemdash::api::{HttpInitClient, InitClient};
use hemdash::config::{self, HemdashConfig, schema::expand_home};
use hemdash::session::{Session, SessionOptions, SessionState};
use hemdash::store::{FileStore, KeyValueStore};
use hemdash::web::{self, DemoBackend};

type CliSession = Session<FileStore, HttpInitClient>;

/// Output format for `hemdash status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            _ => Self::Table,
        }
    }
}

// ---------------------------------------------------------------------------
// Session plumbing
// ---------------------------------------------------------------------------

fn open_session(cfg: &HemdashConfig) -> Result<CliSession> {
    let path = expand_home(&cfg.storage.path);
    let store = FileStore::open(&path, cfg.storage.capacity_bytes)
        .with_context(|| format!("failed to open session storage {}", path.display()))?;
    let client = HttpInitClient::from_config(&cfg.api);
    log::debug!("init endpoint: {}", client.url());

    Session::load(SessionOptions::from_config(cfg), store, client)
        .context("failed to load session state")
}

/// Sleep through pending timers until the initialize flow has reached the
/// dashboard (or was never started).
pub(crate) fn wait_for_dashboard<S: KeyValueStore, C: InitClient>(session: &mut Session<S, C>) {
    while session.is_initializing() {
        let Some(wait) = session.next_timer_in() else {
            break;
        };
        thread::sleep(wait);
        session.advance(wait);
    }
}

// ---------------------------------------------------------------------------
// hemdash dashboard
// ---------------------------------------------------------------------------

/// Start the interactive dashboard.
pub fn run_dashboard(cfg: &HemdashConfig) -> Result<()> {
    let mut session = open_session(cfg)?;
    dashboard::run(&mut session, activity::journal_path(&cfg.logging))
}

// ---------------------------------------------------------------------------
// hemdash init
// ---------------------------------------------------------------------------

/// Press "Initialize" once and print the resulting dashboard.
pub fn run_init(cfg: &HemdashConfig) -> Result<()> {
    let journal = activity::journal_path(&cfg.logging);
    let mut session = open_session(cfg)?;

    let result = session.initialize();
    println!("{}", session.surface().init_status);
    if let Err(e) = result {
        activity::record(journal.as_deref(), &session.drain_activity());
        return Err(e).context(format!("could not reach {}", session.client().url()));
    }

    wait_for_dashboard(&mut session);
    activity::record(journal.as_deref(), &session.drain_activity());
    render::render(&session);
    Ok(())
}

// ---------------------------------------------------------------------------
// hemdash status
// ---------------------------------------------------------------------------

/// Show the persisted session state.
pub fn run_status(cfg: &HemdashConfig, format: OutputFormat) -> Result<()> {
    let session = open_session(cfg)?;
    let state = session.state();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(state)?);
        }
        OutputFormat::Table => print_status_table(state, session.store().path()),
    }
    Ok(())
}

fn print_status_table(state: &SessionState, path: &Path) {
    println!("{}", "hemdash Session".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();

    let initialized = if state.initialized {
        "yes".green()
    } else {
        "no".yellow()
    };
    println!("  {} {}", "Initialized:".bold(), initialized);
    println!("  {} {}", "Theme:      ".bold(), state.settings.theme);
    println!("  {} {}", "Homes:      ".bold(), state.homes_count);

    let recount = state.device_total();
    if recount == state.devices_count || state.homes.is_none() {
        println!("  {} {}", "Devices:    ".bold(), state.devices_count);
    } else {
        println!(
            "  {} {} {}",
            "Devices:    ".bold(),
            state.devices_count,
            format!("({recount} in the room lists)").dimmed()
        );
    }
    println!("  {} {}", "Storage:    ".bold(), path.display().to_string().dimmed());

    if state.homes().is_empty() {
        return;
    }

    println!();
    println!("{}", "Homes".bold().cyan());
    for (name, home) in state.homes() {
        println!("  {}", name.bold());
        for (room, details) in &home.rooms {
            let devices = if details.devices.is_empty() {
                "(no devices)".dimmed().to_string()
            } else {
                details.devices.join(", ")
            };
            println!("    {:<16} {}", room, devices);
        }
    }
}

// ---------------------------------------------------------------------------
// hemdash theme
// ---------------------------------------------------------------------------

/// Toggle the stored theme.
pub fn run_theme(cfg: &HemdashConfig) -> Result<()> {
    let mut session = open_session(cfg)?;
    let theme = session.toggle_theme()?;
    activity::record(
        activity::journal_path(&cfg.logging).as_deref(),
        &session.drain_activity(),
    );
    println!("{} Theme set to {}", "✓".green().bold(), theme.to_string().bold());
    Ok(())
}

// ---------------------------------------------------------------------------
// hemdash history
// ---------------------------------------------------------------------------

/// Show the most recent activity entries.
pub fn run_history(cfg: &HemdashConfig, limit: usize) -> Result<()> {
    let Some(path) = activity::journal_path(&cfg.logging) else {
        println!(
            "{}",
            "Activity journal is disabled (logging.activity_log = false).".yellow()
        );
        return Ok(());
    };

    let entries = activity::read_recent(&path, limit);
    if entries.is_empty() {
        println!("{}", "No activity yet.".yellow());
        return Ok(());
    }

    println!("{}", "Recent Activity".bold().cyan());
    println!("{}", "=".repeat(60));
    for (i, entry) in entries.iter().enumerate() {
        let kind = serde_json::to_value(entry.event.kind)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        let line = format!(
            "  {:<20} {:<22} {}",
            truncate(&entry.timestamp, 19),
            kind,
            entry.event.detail.as_deref().unwrap_or("")
        );
        if i % 2 == 0 {
            println!("{line}");
        } else {
            println!("{}", line.dimmed());
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// hemdash serve
// ---------------------------------------------------------------------------

/// Run the demo backend.
pub fn run_serve(addr: &str, homes: Option<&Path>) -> Result<()> {
    let backend = match homes {
        Some(path) => DemoBackend::from_file(path)?,
        None => DemoBackend::sample(),
    };
    web::serve(addr, &backend)
}

// ---------------------------------------------------------------------------
// hemdash config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective hemdash Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source("~/.hemdash/config.toml", global_exists);
    print_source(".hemdash.toml", project_exists);
    println!(
        "  {} {}",
        "·".dimmed(),
        "HEMDASH_* environment variables".dimmed()
    );

    Ok(())
}

fn print_source(name: &str, exists: bool) {
    if exists {
        println!("  {} {}", "✓".green(), name.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
    }
}

/// Write a default config file at `~/.hemdash/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Truncate a string to `max_len` characters.
fn truncate(s: &str, max_len: usize) -> String {
    s.chars().take(max_len).collect()
}
