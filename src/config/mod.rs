//! Configuration system for hemdash.
//!
//! Provides a layered configuration hierarchy:
//!
//! 1. **Built-in defaults** — hardcoded in [`schema::HemdashConfig::default()`]
//! 2. **User global config** — `~/.hemdash/config.toml`
//! 3. **Project local config** — `.hemdash.toml` in the current working directory
//! 4. **Environment variables** — `HEMDASH_*` overrides (highest precedence)
//!
//! Each TOML file is deserialized with `serde(default)`, so a file only needs
//! the keys it wants to change.
//!
//! # Usage
//!
//! ```rust,ignore
//! use hemdash::config;
//!
//! let cfg = config::load();
//! println!("init endpoint: {}", cfg.api.init_url());
//! ```

pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub use schema::HemdashConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// A resolved configuration plus the problems met while reading it.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub config: HemdashConfig,
    /// One message per config file that was skipped.
    pub warnings: Vec<String>,
}

/// Load the fully resolved hemdash configuration.
///
/// Merges all layers in order: defaults → global TOML → project TOML → env
/// vars. Skipped files are reported at warn level.
pub fn load() -> HemdashConfig {
    let loaded = load_reporting();
    for warning in &loaded.warnings {
        log::warn!("{warning}");
    }
    loaded.config
}

/// Like [`load`], but hands the warnings back instead of logging them, for
/// callers that read the config before a logger exists.
pub fn load_reporting() -> Loaded {
    let mut warnings = Vec::new();
    let mut config = HemdashConfig::default();

    if let Some(global) = load_toml_file(global_config_path(), &mut warnings) {
        config = global;
    }

    if let Some(project) = load_toml_file(project_config_path(), &mut warnings) {
        config = project;
    }

    apply_env_overrides(&mut config);

    Loaded { config, warnings }
}

/// Load a TOML config file from the given path (if it exists).
///
/// Malformed files are noted in `warnings` and otherwise ignored, so a typo
/// in a config file never keeps the dashboard from starting.
fn load_toml_file(path: Option<PathBuf>, warnings: &mut Vec<String>) -> Option<HemdashConfig> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            warnings.push(format!("ignoring malformed config {}: {e}", path.display()));
            None
        }
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.hemdash/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".hemdash").join("config.toml"))
}

/// Path to the project local config: `.hemdash.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".hemdash.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `HEMDASH_API_URL` — backend base URL
/// - `HEMDASH_API_TIMEOUT_MS` — init request timeout
/// - `HEMDASH_STORAGE_PATH` — key-value store file
/// - `HEMDASH_LOG_LEVEL` — diagnostics level
/// - `HEMDASH_STOP_OPTIMIZER_ON_LEAVE` — `1`/`true`/`yes`/`on`
fn apply_env_overrides(config: &mut HemdashConfig) {
    if let Ok(val) = std::env::var("HEMDASH_API_URL")
        && !val.is_empty()
    {
        config.api.base_url = val;
    }
    if let Ok(val) = std::env::var("HEMDASH_API_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.api.timeout_ms = ms;
    }
    if let Ok(val) = std::env::var("HEMDASH_STORAGE_PATH")
        && !val.is_empty()
    {
        config.storage.path = val;
    }
    if let Ok(val) = std::env::var("HEMDASH_LOG_LEVEL")
        && !val.is_empty()
    {
        config.logging.level = val;
    }
    if let Ok(val) = std::env::var("HEMDASH_STOP_OPTIMIZER_ON_LEAVE") {
        config.session.stop_optimizer_on_leave = is_truthy(&val);
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.hemdash/config.toml`.
///
/// Returns an error if the file already exists (use `force = true` to
/// overwrite).
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.hemdash/ directory")?;
    }

    fs::write(&path, HemdashConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single config key to a value in the global config file.
///
/// Supports dotted keys like `api.base_url`. When no global file exists yet
/// the defaults are written first and then updated.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let source = if path.exists() {
        fs::read_to_string(&path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&HemdashConfig::default())
            .context("failed to serialize default config")?
    };

    let mut root: toml::Value =
        toml::from_str(&source).context("failed to parse config as TOML value")?;
    set_toml_value(&mut root, key, value)?;

    // Reject values that no longer fit the schema before touching the file.
    let rendered = toml::to_string_pretty(&root).context("failed to serialize config")?;
    toml::from_str::<HemdashConfig>(&rendered)
        .with_context(|| format!("'{value}' is not a valid value for '{key}'"))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, rendered).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        anyhow::bail!("invalid config key: '{key}'");
    }

    let mut current = root;
    for &part in &parts[..parts.len() - 1] {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let leaf = parts[parts.len() - 1];
    let table = current.as_table_mut().with_context(|| {
        format!(
            "expected table at '{}'",
            key.rsplit_once('.').map(|(s, _)| s).unwrap_or("")
        )
    })?;

    let new_value = match table.get(leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::String(_)) => toml::Value::String(raw_value.to_string()),
        Some(_) => anyhow::bail!("config key '{key}' cannot be set from the command line"),
        None => anyhow::bail!("config key not found: '{key}'"),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
