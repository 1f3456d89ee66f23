//! Display regions and control states a renderer draws from.
//!
//! The session writes here; renderers only read. Nothing on the surface is
//! persisted: counters, progress and labels start fresh with every session.

use std::collections::VecDeque;

/// Idle and busy labels of the process buttons.
pub const START_OPTIMIZATION: &str = "Start Home Optimization";
pub const STOP_OPTIMIZATION: &str = "Stop Home Optimization";
pub const START_TRAINING: &str = "Start Training";
pub const TRAINING_BUSY: &str = "Training...";
pub const RUN_SIMULATION: &str = "Run Simulation";
pub const SIMULATION_BUSY: &str = "Simulating...";

/// A push button with a label and an enabled flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub disabled: bool,
}

impl Button {
    fn idle(label: &str) -> Self {
        Self {
            label: label.to_string(),
            disabled: false,
        }
    }

    pub(crate) fn set_busy(&mut self, label: &str) {
        self.label = label.to_string();
        self.disabled = true;
    }

    pub(crate) fn set_idle(&mut self, label: &str) {
        self.label = label.to_string();
        self.disabled = false;
    }
}

/// Everything a renderer shows, outside of which page is visible.
#[derive(Debug, Clone)]
pub struct Surface {
    pub dark_mode: bool,
    /// Today's date, e.g. "October 19, 2026".
    pub current_date: String,

    // Header status.
    pub system_status: String,
    pub system_status_active: bool,

    // Welcome screen.
    pub init_status: String,
    pub init_loader_visible: bool,
    pub welcome_button_visible: bool,

    // Dashboard.
    pub devices_count: u64,
    pub homes_count: u64,
    pub kwh_saved: u64,
    pub money_saved: u64,
    pub optimization_button: Button,
    pub optimization_active: bool,
    pub optimization_status: String,

    // Train page.
    pub progress_pct: u8,
    pub savings_label: String,
    pub train_button: Button,
    pub simulate_button: Button,

    notices: VecDeque<String>,
}

impl Surface {
    pub fn new(current_date: String) -> Self {
        Self {
            dark_mode: false,
            current_date,
            system_status: "Inactive".to_string(),
            system_status_active: false,
            init_status: String::new(),
            init_loader_visible: false,
            welcome_button_visible: true,
            devices_count: 0,
            homes_count: 0,
            kwh_saved: 0,
            money_saved: 0,
            optimization_button: Button::idle(START_OPTIMIZATION),
            optimization_active: false,
            optimization_status: "Optimization Inactive".to_string(),
            progress_pct: 0,
            savings_label: "--".to_string(),
            train_button: Button::idle(START_TRAINING),
            simulate_button: Button::idle(RUN_SIMULATION),
            notices: VecDeque::new(),
        }
    }

    /// Money saved as displayed: `$N`.
    pub fn money_text(&self) -> String {
        format!("${}", self.money_saved)
    }

    /// Progress caption: `N% Trained`.
    pub fn progress_text(&self) -> String {
        format!("{}% Trained", self.progress_pct)
    }

    /// Take the pending acknowledgment/completion notices, oldest first.
    pub fn drain_notices(&mut self) -> Vec<String> {
        self.notices.drain(..).collect()
    }

    pub fn pending_notices(&self) -> impl Iterator<Item = &str> {
        self.notices.iter().map(String::as_str)
    }

    pub(crate) fn notify(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::info!("notice: {message}");
        self.notices.push_back(message);
    }

    pub(crate) fn set_status(&mut self, text: &str, active: bool) {
        self.system_status = text.to_string();
        self.system_status_active = active;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_surface_shows_idle_controls() {
        let surface = Surface::new("October 19, 2026".to_string());
        assert!(surface.welcome_button_visible);
        assert!(!surface.init_loader_visible);
        assert_eq!(surface.optimization_button.label, START_OPTIMIZATION);
        assert_eq!(surface.money_text(), "$0");
        assert_eq!(surface.progress_text(), "0% Trained");
        assert!(!surface.train_button.disabled);
    }

    #[test]
    fn notices_drain_in_order() {
        let mut surface = Surface::new(String::new());
        surface.notify("one");
        surface.notify("two");
        assert_eq!(surface.pending_notices().count(), 2);
        assert_eq!(surface.drain_notices(), vec!["one", "two"]);
        assert!(surface.drain_notices().is_empty());
    }
}
