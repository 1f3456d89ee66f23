//! Configuration schema and defaults for hemdash.
//!
//! Defines the TOML-serializable configuration structure with the sections
//! `[api]`, `[storage]`, `[timing]`, `[session]` and `[logging]`.
//!
//! Every field has a built-in default that reproduces the stock dashboard
//! behaviour. Users only need to set the values they want to override.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level hemdash configuration.
///
/// Maps directly to the `~/.hemdash/config.toml` and `.hemdash.toml` file
/// schemas. All sections and fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HemdashConfig {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub timing: TimingConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [api]
// ---------------------------------------------------------------------------

/// Initialization endpoint settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the backend (scheme + host + port).
    pub base_url: String,
    /// Path of the initialization endpoint.
    pub init_path: String,
    /// Request timeout in milliseconds. `0` leaves it to the transport.
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            init_path: "/api/init".to_string(),
            timeout_ms: 30_000,
        }
    }
}

impl ApiConfig {
    /// Full URL of the initialization endpoint.
    pub fn init_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if self.init_path.starts_with('/') {
            format!("{base}{}", self.init_path)
        } else {
            format!("{base}/{}", self.init_path)
        }
    }
}

// ---------------------------------------------------------------------------
// [storage]
// ---------------------------------------------------------------------------

/// Persistence store settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path of the key-value store file. `~` is expanded to the home directory.
    pub path: String,
    /// Key under which the session state is stored.
    pub key: String,
    /// Capacity of the store in bytes (sum of key and value lengths).
    pub capacity_bytes: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: "~/.hemdash/storage.json".to_string(),
            key: "energySystemData".to_string(),
            capacity_bytes: 5 * 1024 * 1024,
        }
    }
}

// ---------------------------------------------------------------------------
// [timing]
// ---------------------------------------------------------------------------

/// Pacing delays for the simulated workflows (milliseconds).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Delay between a successful init response and the dashboard.
    pub init_display_ms: u64,
    /// "Loading system..." phase when the session was already initialized.
    pub reload_loading_ms: u64,
    /// "System loaded successfully!" phase before the dashboard appears.
    pub reload_loaded_ms: u64,
    /// Time for an entering page to settle its fade/slide-in.
    pub page_transition_ms: u64,
    /// Period of the optimization ticker.
    pub optimization_period_ms: u64,
    /// Duration of a simulated training run.
    pub training_ms: u64,
    /// Duration of a simulated savings simulation.
    pub simulation_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            init_display_ms: 1000,
            reload_loading_ms: 1000,
            reload_loaded_ms: 500,
            page_transition_ms: 50,
            optimization_period_ms: 10_000,
            training_ms: 3000,
            simulation_ms: 2000,
        }
    }
}

impl TimingConfig {
    pub fn init_display(&self) -> Duration {
        Duration::from_millis(self.init_display_ms)
    }

    pub fn reload_loading(&self) -> Duration {
        Duration::from_millis(self.reload_loading_ms)
    }

    pub fn reload_loaded(&self) -> Duration {
        Duration::from_millis(self.reload_loaded_ms)
    }

    pub fn page_transition(&self) -> Duration {
        Duration::from_millis(self.page_transition_ms)
    }

    /// Optimization period, floored at 1 ms so a zero setting cannot spin.
    pub fn optimization_period(&self) -> Duration {
        Duration::from_millis(self.optimization_period_ms.max(1))
    }

    pub fn training(&self) -> Duration {
        Duration::from_millis(self.training_ms)
    }

    pub fn simulation(&self) -> Duration {
        Duration::from_millis(self.simulation_ms)
    }
}

// ---------------------------------------------------------------------------
// [session]
// ---------------------------------------------------------------------------

/// Session behaviour toggles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Stop the optimization ticker when the user leaves the dashboard.
    pub stop_optimizer_on_leave: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            stop_optimizer_on_leave: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level for diagnostics: `"error"`, `"warn"`, `"info"`, `"debug"`.
    pub level: String,
    /// Whether user-visible activity is appended to the activity journal.
    pub activity_log: bool,
    /// Path to the activity journal. `~` is expanded to the home directory.
    pub activity_path: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            activity_log: true,
            activity_path: "~/.hemdash/activity.jsonl".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default TOML content
// ---------------------------------------------------------------------------

impl HemdashConfig {
    /// Generate the annotated default TOML config file content.
    pub fn default_toml() -> String {
        r#"# hemdash Configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (HEMDASH_*)
#   2. Project config (.hemdash.toml in current directory)
#   3. User global config (~/.hemdash/config.toml)
#   4. Built-in defaults

[api]
base_url = "http://127.0.0.1:8000"
init_path = "/api/init"
timeout_ms = 30000

[storage]
path = "~/.hemdash/storage.json"
key = "energySystemData"
capacity_bytes = 5242880   # 5 MiB

[timing]
init_display_ms = 1000
reload_loading_ms = 1000
reload_loaded_ms = 500
page_transition_ms = 50
optimization_period_ms = 10000
training_ms = 3000
simulation_ms = 2000

[session]
stop_optimizer_on_leave = true   # false keeps the ticker running on sub-pages

[logging]
level = "warn"   # error | warn | info | debug | trace
activity_log = true
activity_path = "~/.hemdash/activity.jsonl"
"#
        .to_string()
    }
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_home(path: &str) -> std::path::PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    std::path::PathBuf::from(path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_toml_parses_back() {
        let toml_str = HemdashConfig::default_toml();
        let config: HemdashConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, HemdashConfig::default());
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let config: HemdashConfig = toml::from_str("[api]\ntimeout_ms = 5\n").unwrap();
        assert_eq!(config.api.timeout_ms, 5);
        assert_eq!(config.api.init_path, "/api/init");
        assert_eq!(config.timing, TimingConfig::default());
    }

    #[test]
    fn init_url_joins_base_and_path() {
        let mut api = ApiConfig::default();
        assert_eq!(api.init_url(), "http://127.0.0.1:8000/api/init");

        api.base_url = "http://example.test/".to_string();
        api.init_path = "api/init".to_string();
        assert_eq!(api.init_url(), "http://example.test/api/init");
    }

    #[test]
    fn zero_optimization_period_is_floored() {
        let timing = TimingConfig {
            optimization_period_ms: 0,
            ..TimingConfig::default()
        };
        assert_eq!(timing.optimization_period(), Duration::from_millis(1));
    }

    #[test]
    fn expand_home_leaves_plain_paths_alone() {
        assert_eq!(
            expand_home("/tmp/storage.json"),
            std::path::PathBuf::from("/tmp/storage.json")
        );
    }
}
