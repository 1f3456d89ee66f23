//! Client session state manager.
//!
//! [`Session`] owns everything the dashboard knows: the persisted
//! [`SessionState`], the visible [`View`], the four selectors, the display
//! [`Surface`] and the timers behind the simulated workflows. Every
//! operation is a method on it; there is no global state.
//!
//! # Persistence
//!
//! The state is written in full under one store key after every mutation
//! (initialization and theme toggle). A write is attempted before the
//! in-memory state changes, so a failed write leaves both unchanged.
//!
//! # Time
//!
//! The session is single-threaded. The init request blocks inside
//! [`Session::initialize`]; every other delay is a timer that only fires
//! when the driver calls [`Session::advance`].
//!
//! # Example
//!
//! ```rust,ignore
//! let mut session = Session::load(SessionOptions::default(), MemoryStore::new(), client)?;
//! session.initialize()?;
//! session.advance(Duration::from_secs(1));
//! assert_eq!(session.view(), View::Dashboard);
//! ```

pub mod error;
pub mod model;
pub mod selectors;
pub mod simulate;
pub mod surface;
pub mod view;

use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;

pub use error::SessionError;
pub use model::{Home, Homes, Room, SessionState, Settings, Theme};
pub use selectors::{Selector, SelectorId};
pub use surface::Surface;
pub use view::{PagePhase, View};

use self::selectors::Selectors;
use self::simulate::{SavingsRange, TickGain, random_progress};
use self::surface::{
    RUN_SIMULATION, SIMULATION_BUSY, START_OPTIMIZATION, START_TRAINING, STOP_OPTIMIZATION,
    TRAINING_BUSY,
};
use self::view::Navigation;
use crate::activity::{ActivityEvent, ActivityKind};
use crate::api::InitClient;
use crate::config::HemdashConfig;
use crate::config::schema::TimingConfig;
use crate::store::KeyValueStore;
use crate::timers::{TimerId, TimerQueue};

/// Option tiles on the manage-homes page.
pub const HOME_OPTIONS: [&str; 5] = [
    "Add Home",
    "Delete Home",
    "Add Room",
    "Rename Room",
    "Delete Room",
];

/// Option tiles on the manage-devices page.
pub const DEVICE_OPTIONS: [&str; 5] = [
    "Add Device",
    "Update Device",
    "Remove Device",
    "Assign Device",
    "Manage Permissions",
];

const INIT_IN_PROGRESS: &str = "Initializing system...";
const INIT_SUCCEEDED: &str = "System initialized successfully!";
const INIT_FAILED: &str = "Error initializing system. Please try again.";
const RELOAD_IN_PROGRESS: &str = "Loading system...";
const RELOAD_DONE: &str = "System loaded successfully!";

/// Result of pressing the initialize button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// Fresh data was fetched and saved; the dashboard follows after the
    /// display delay.
    Initialized,
    /// The session was already initialized; the dashboard follows after the
    /// loading phases without a network call.
    Reloading,
    /// An earlier press is still being handled; this one was dropped.
    AlreadyInFlight,
}

/// Result of pressing a training/simulation button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStart {
    Started,
    /// The button is disabled while a previous run is going.
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Task {
    ReloadLoaded,
    ShowDashboard,
    SettlePage(View),
    OptimizationTick,
    TrainingDone(Option<String>),
    SimulationDone(Option<String>),
}

/// Knobs the session takes from the resolved configuration.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub storage_key: String,
    pub timing: TimingConfig,
    pub stop_optimizer_on_leave: bool,
}

impl SessionOptions {
    pub fn from_config(config: &HemdashConfig) -> Self {
        Self {
            storage_key: config.storage.key.clone(),
            timing: config.timing.clone(),
            stop_optimizer_on_leave: config.session.stop_optimizer_on_leave,
        }
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from_config(&HemdashConfig::default())
    }
}

/// The dashboard session.
pub struct Session<S, C> {
    options: SessionOptions,
    store: S,
    client: C,
    state: SessionState,
    nav: Navigation,
    selectors: Selectors,
    surface: Surface,
    timers: TimerQueue<Task>,
    rng: StdRng,
    init_in_flight: bool,
    optimizer: Option<TimerId>,
    activity: Vec<ActivityEvent>,
}

impl<S: KeyValueStore, C: InitClient> Session<S, C> {
    /// Start a session from whatever the store holds.
    ///
    /// A missing record yields the default uninitialized state. A record
    /// that does not decode is fatal: the store is only ever written by the
    /// session itself.
    pub fn load(options: SessionOptions, store: S, client: C) -> Result<Self, SessionError> {
        let state = match store.get(&options.storage_key)? {
            Some(raw) => serde_json::from_str(&raw).map_err(SessionError::CorruptState)?,
            None => SessionState::default(),
        };
        log::debug!(
            "loaded session: initialized={} homes={} devices={} theme={}",
            state.initialized,
            state.homes_count,
            state.devices_count,
            state.settings.theme
        );

        let today = chrono::Local::now().format("%B %-d, %Y").to_string();
        let mut surface = Surface::new(today);
        surface.dark_mode = state.settings.theme.is_dark();
        if state.initialized {
            surface.set_status("Ready", true);
        }

        Ok(Self {
            options,
            store,
            client,
            state,
            nav: Navigation::default(),
            selectors: Selectors::default(),
            surface,
            timers: TimerQueue::new(),
            rng: StdRng::from_entropy(),
            init_in_flight: false,
            optimizer: None,
            activity: Vec::new(),
        })
    }

    /// Replace the random source, e.g. with a seeded one.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    // -- Accessors --

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn view(&self) -> View {
        self.nav.current()
    }

    pub fn page_phase(&self) -> PagePhase {
        self.nav.phase()
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn selector(&self, id: SelectorId) -> &Selector {
        self.selectors.get(id)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn is_initializing(&self) -> bool {
        self.init_in_flight
    }

    pub fn optimization_running(&self) -> bool {
        self.optimizer.is_some()
    }

    /// Virtual time elapsed since the session started.
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    /// Time until the next pending timer, if any.
    pub fn next_timer_in(&self) -> Option<Duration> {
        self.timers
            .next_deadline()
            .map(|deadline| deadline.saturating_sub(self.timers.now()))
    }

    /// Take the queued notices (acknowledgments and completion reports).
    pub fn take_notices(&mut self) -> Vec<String> {
        self.surface.drain_notices()
    }

    /// Take the queued activity events.
    pub fn drain_activity(&mut self) -> Vec<ActivityEvent> {
        std::mem::take(&mut self.activity)
    }

    // -- Persistence --

    /// Write the current state to the store.
    pub fn save(&mut self) -> Result<(), SessionError> {
        self.commit(self.state.clone())
    }

    /// Persist `next` and make it the current state. On failure the current
    /// state is kept.
    fn commit(&mut self, next: SessionState) -> Result<(), SessionError> {
        let json = serde_json::to_string(&next).map_err(SessionError::Encode)?;
        self.store.set(&self.options.storage_key, &json)?;
        log::debug!(
            "saved session state ({} bytes) under '{}'",
            json.len(),
            self.options.storage_key
        );
        self.state = next;
        Ok(())
    }

    // -- Initialize --

    /// Press the welcome screen's initialize button.
    ///
    /// On failure the welcome screen is re-armed and nothing is persisted;
    /// the returned error carries the cause.
    pub fn initialize(&mut self) -> Result<InitOutcome, SessionError> {
        if self.init_in_flight {
            log::info!("initialize pressed while a previous press is in flight; ignoring");
            return Ok(InitOutcome::AlreadyInFlight);
        }

        let current = self.nav.current();
        if current != View::Welcome {
            return Err(SessionError::InvalidTransition {
                from: current,
                to: View::Dashboard,
            });
        }

        self.init_in_flight = true;
        self.surface.init_loader_visible = true;
        self.surface.welcome_button_visible = false;

        if self.state.initialized {
            self.surface.init_status = RELOAD_IN_PROGRESS.to_string();
            self.timers
                .schedule_once(self.options.timing.reload_loading(), Task::ReloadLoaded);
            self.activity
                .push(ActivityEvent::new(ActivityKind::SessionReloaded));
            return Ok(InitOutcome::Reloading);
        }

        self.surface.init_status = INIT_IN_PROGRESS.to_string();

        let response = match self.client.fetch_init() {
            Ok(response) => response,
            Err(e) => {
                log::error!("initialization error: {e}");
                self.fail_initialization(e.to_string());
                return Err(e.into());
            }
        };

        let mut next = self.state.clone();
        next.initialized = true;
        next.devices_count = response.devices_count;
        next.homes_count = response.resolved_homes_count();
        next.homes = Some(response.homes);

        if let Err(e) = self.commit(next) {
            log::error!("could not persist initialized state: {e}");
            self.fail_initialization(e.to_string());
            return Err(e);
        }

        self.surface.set_status("Active", true);
        self.surface.init_status = INIT_SUCCEEDED.to_string();
        self.timers
            .schedule_once(self.options.timing.init_display(), Task::ShowDashboard);
        self.activity.push(ActivityEvent::with_detail(
            ActivityKind::InitSucceeded,
            format!(
                "{} homes, {} devices",
                self.state.homes_count, self.state.devices_count
            ),
        ));

        Ok(InitOutcome::Initialized)
    }

    fn fail_initialization(&mut self, detail: String) {
        self.surface.init_status = INIT_FAILED.to_string();
        self.surface.welcome_button_visible = true;
        self.surface.init_loader_visible = false;
        self.init_in_flight = false;
        self.activity
            .push(ActivityEvent::with_detail(ActivityKind::InitFailed, detail));
    }

    // -- Theme --

    /// Flip between light and dark, persisting the choice.
    pub fn toggle_theme(&mut self) -> Result<Theme, SessionError> {
        let mut next = self.state.clone();
        next.settings.theme = next.settings.theme.toggled();
        self.commit(next)?;

        let theme = self.state.settings.theme;
        self.surface.dark_mode = theme.is_dark();
        self.activity.push(ActivityEvent::with_detail(
            ActivityKind::ThemeChanged,
            theme.to_string(),
        ));
        Ok(theme)
    }

    // -- Navigation --

    /// Go from the dashboard to a sub-page, or from a sub-page back.
    pub fn navigate(&mut self, to: View) -> Result<(), SessionError> {
        let from = self.nav.current();
        if !View::can_navigate(from, to) {
            return Err(SessionError::InvalidTransition { from, to });
        }

        if from == View::Dashboard && self.options.stop_optimizer_on_leave && self.optimizer.is_some()
        {
            log::info!("leaving the dashboard; stopping optimization");
            self.stop_optimization();
        }

        self.enter(to);
        Ok(())
    }

    /// The "back to dashboard" button on every sub-page.
    pub fn back_to_dashboard(&mut self) -> Result<(), SessionError> {
        self.navigate(View::Dashboard)
    }

    fn enter(&mut self, to: View) {
        let from = self.nav.enter(to);
        log::debug!("view {from} -> {to}");
        self.timers
            .schedule_once(self.options.timing.page_transition(), Task::SettlePage(to));
        self.selectors.populate_page(to, &self.state);
        self.activity.push(ActivityEvent::with_detail(
            ActivityKind::Navigated,
            to.to_string(),
        ));
    }

    fn refresh_dashboard(&mut self) {
        self.surface.devices_count = self.state.devices_count;
        self.surface.homes_count = self.state.homes_count;
    }

    // -- Selectors and option tiles --

    /// Pick `option` in a selector on the visible page.
    pub fn select(&mut self, id: SelectorId, option: &str) -> Result<(), SessionError> {
        self.require_page(id.element_id(), id.page())?;
        if !self.selectors.select(id, option) {
            return Err(SessionError::UnknownOption {
                selector: id,
                option: option.to_string(),
            });
        }

        match id {
            SelectorId::Home | SelectorId::DeviceHome => {
                self.surface.notify(format!("Selected home: {option}"));
            }
            SelectorId::Device => {
                self.surface.notify(format!("Selected device: {option}"));
            }
            SelectorId::TrainHome => {
                self.surface
                    .notify(format!("Selected home for training: {option}"));
                self.surface.progress_pct = random_progress(&mut self.rng);
                self.surface.savings_label = SavingsRange::random(&mut self.rng).to_string();
            }
        }

        self.activity.push(ActivityEvent::with_detail(
            ActivityKind::Selected,
            format!("{id}={option}"),
        ));
        Ok(())
    }

    /// Activate an option tile on the manage-homes or manage-devices page.
    pub fn choose_option(&mut self, option: &str) -> Result<(), SessionError> {
        let page = self.nav.current();
        let (tiles, kind) = match page {
            View::ManageHomes => (&HOME_OPTIONS, "home"),
            View::ManageDevices => (&DEVICE_OPTIONS, "device"),
            _ => {
                return Err(SessionError::UnknownTile {
                    page,
                    option: option.to_string(),
                });
            }
        };

        if !tiles.contains(&option) {
            return Err(SessionError::UnknownTile {
                page,
                option: option.to_string(),
            });
        }

        self.surface
            .notify(format!("Selected {kind} option: {option}"));
        Ok(())
    }

    fn require_page(&self, control: &'static str, page: View) -> Result<(), SessionError> {
        if self.nav.current() == page {
            Ok(())
        } else {
            Err(SessionError::ControlHidden { control, page })
        }
    }

    // -- Simulated processes --

    /// Press the dashboard's optimization button. Returns whether
    /// optimization is now running.
    pub fn toggle_optimization(&mut self) -> Result<bool, SessionError> {
        self.require_page("start-optimization", View::Dashboard)?;

        if self.optimizer.is_some() {
            self.stop_optimization();
            return Ok(false);
        }

        self.surface.optimization_active = true;
        self.surface.optimization_button.label = STOP_OPTIMIZATION.to_string();
        self.surface.optimization_status = "Optimization Active".to_string();
        let id = self.timers.schedule_repeating(
            self.options.timing.optimization_period(),
            Task::OptimizationTick,
        );
        self.optimizer = Some(id);
        self.activity
            .push(ActivityEvent::new(ActivityKind::OptimizationStarted));
        Ok(true)
    }

    fn stop_optimization(&mut self) {
        if let Some(id) = self.optimizer.take() {
            self.timers.cancel(id);
        }
        self.surface.optimization_active = false;
        self.surface.optimization_button.label = START_OPTIMIZATION.to_string();
        self.surface.optimization_status = "Optimization Inactive".to_string();
        self.activity.push(ActivityEvent::with_detail(
            ActivityKind::OptimizationStopped,
            format!(
                "{} kWh, {} saved",
                self.surface.kwh_saved,
                self.surface.money_text()
            ),
        ));
    }

    /// Press "Start Training" on the train page.
    pub fn start_training(&mut self) -> Result<ProcessStart, SessionError> {
        self.require_page("train-button", View::Train)?;
        if self.surface.train_button.disabled {
            return Ok(ProcessStart::Busy);
        }

        let home = self.train_home();
        self.surface.train_button.set_busy(TRAINING_BUSY);
        self.timers
            .schedule_once(self.options.timing.training(), Task::TrainingDone(home));
        Ok(ProcessStart::Started)
    }

    /// Press "Run Simulation" on the train page.
    pub fn run_simulation(&mut self) -> Result<ProcessStart, SessionError> {
        self.require_page("simulate-button", View::Train)?;
        if self.surface.simulate_button.disabled {
            return Ok(ProcessStart::Busy);
        }

        let home = self.train_home();
        self.surface.simulate_button.set_busy(SIMULATION_BUSY);
        self.timers
            .schedule_once(self.options.timing.simulation(), Task::SimulationDone(home));
        Ok(ProcessStart::Started)
    }

    fn train_home(&self) -> Option<String> {
        self.selectors
            .get(SelectorId::TrainHome)
            .selected()
            .map(str::to_string)
    }

    // -- Time --

    /// Let `by` pass, firing every timer that falls due, in order.
    pub fn advance(&mut self, by: Duration) {
        let target = self.timers.now().saturating_add(by);
        while let Some((id, task)) = self.timers.pop_due(target) {
            log::trace!("timer {id:?} fired at {:?}: {task:?}", self.timers.now());
            self.run_task(id, task);
        }
        self.timers.settle(target);
    }

    fn run_task(&mut self, id: TimerId, task: Task) {
        match task {
            Task::ReloadLoaded => {
                self.surface.init_status = RELOAD_DONE.to_string();
                self.timers
                    .schedule_once(self.options.timing.reload_loaded(), Task::ShowDashboard);
            }
            Task::ShowDashboard => {
                self.refresh_dashboard();
                self.init_in_flight = false;
                self.surface.init_loader_visible = false;
                if self.nav.current() == View::Welcome {
                    self.enter(View::Dashboard);
                }
            }
            Task::SettlePage(view) => self.nav.settle(view),
            Task::OptimizationTick => {
                if self.surface.optimization_active && self.optimizer == Some(id) {
                    let gain = TickGain::random(&mut self.rng);
                    self.surface.kwh_saved += gain.kwh;
                    self.surface.money_saved += gain.money;
                } else {
                    self.timers.cancel(id);
                }
            }
            Task::TrainingDone(home) => {
                self.surface.progress_pct = 100;
                self.surface.train_button.set_idle(START_TRAINING);
                self.surface
                    .notify(completion_notice("Training", home.as_deref()));
                self.activity.push(ActivityEvent {
                    kind: ActivityKind::TrainingCompleted,
                    detail: home,
                });
            }
            Task::SimulationDone(home) => {
                self.surface.savings_label = SavingsRange::random(&mut self.rng).to_string();
                self.surface.simulate_button.set_idle(RUN_SIMULATION);
                self.surface
                    .notify(completion_notice("Simulation", home.as_deref()));
                self.activity.push(ActivityEvent {
                    kind: ActivityKind::SimulationCompleted,
                    detail: home,
                });
            }
        }
    }
}

fn completion_notice(process: &str, home: Option<&str>) -> String {
    match home {
        Some(home) => format!("{process} completed for {home}!"),
        None => format!("{process} completed!"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{InitError, InitResponse};
    use crate::store::MemoryStore;

    struct Fixed(Result<InitResponse, u16>);

    impl InitClient for Fixed {
        fn fetch_init(&mut self) -> Result<InitResponse, InitError> {
            self.0
                .clone()
                .map_err(|status| InitError::Status { status })
        }
    }

    fn response() -> InitResponse {
        serde_json::from_value(serde_json::json!({
            "devices_count": 3,
            "homes": {
                "Cottage": { "rooms": { "Den": { "devices": ["Lamp", "Heater"] } } },
                "Flat": { "rooms": { "Hall": { "devices": ["Lamp"] } } }
            }
        }))
        .unwrap()
    }

    fn session(client: Fixed) -> Session<MemoryStore, Fixed> {
        Session::load(SessionOptions::default(), MemoryStore::new(), client)
            .unwrap()
            .with_rng(StdRng::seed_from_u64(7))
    }

    fn on_dashboard() -> Session<MemoryStore, Fixed> {
        let mut s = session(Fixed(Ok(response())));
        s.initialize().unwrap();
        s.advance(Duration::from_secs(2));
        s
    }

    #[test]
    fn dashboard_counters_refresh_on_entry() {
        let s = on_dashboard();
        assert_eq!(s.view(), View::Dashboard);
        assert_eq!(s.surface().devices_count, 3);
        assert_eq!(s.surface().homes_count, 2);
        assert_eq!(s.page_phase(), PagePhase::Settled);
    }

    #[test]
    fn page_entry_settles_after_transition_delay() {
        let mut s = on_dashboard();
        s.navigate(View::ManageHomes).unwrap();
        assert_eq!(s.page_phase(), PagePhase::Entering);
        s.advance(Duration::from_millis(49));
        assert_eq!(s.page_phase(), PagePhase::Entering);
        s.advance(Duration::from_millis(1));
        assert_eq!(s.page_phase(), PagePhase::Settled);
    }

    #[test]
    fn initialize_off_the_welcome_screen_is_rejected() {
        let mut s = on_dashboard();
        assert!(matches!(
            s.initialize(),
            Err(SessionError::InvalidTransition {
                from: View::Dashboard,
                to: View::Dashboard
            })
        ));
    }

    #[test]
    fn option_tiles_acknowledge_known_options() {
        let mut s = on_dashboard();
        s.navigate(View::ManageDevices).unwrap();
        s.choose_option("Add Device").unwrap();
        assert_eq!(s.take_notices(), vec!["Selected device option: Add Device"]);

        assert!(matches!(
            s.choose_option("Add Home"),
            Err(SessionError::UnknownTile { .. })
        ));
    }

    #[test]
    fn hidden_controls_are_rejected() {
        let mut s = on_dashboard();
        assert!(matches!(
            s.start_training(),
            Err(SessionError::ControlHidden { page: View::Train, .. })
        ));
        assert!(matches!(
            s.select(SelectorId::Home, "Cottage"),
            Err(SessionError::ControlHidden { .. })
        ));
    }

    #[test]
    fn train_home_selection_randomizes_progress_and_savings() {
        let mut s = on_dashboard();
        s.navigate(View::Train).unwrap();
        s.select(SelectorId::TrainHome, "Flat").unwrap();

        assert!(s.surface().progress_pct < 100);
        let label = &s.surface().savings_label;
        let (low, high) = label.trim_end_matches('%').split_once('-').unwrap();
        let (low, high): (u8, u8) = (low.parse().unwrap(), high.parse().unwrap());
        assert!((10..25).contains(&low));
        assert_eq!(high, low + 7);
        assert_eq!(s.take_notices(), vec!["Selected home for training: Flat"]);
    }

    #[test]
    fn advancing_past_the_clock_range_saturates() {
        let mut s = on_dashboard();
        s.navigate(View::Train).unwrap();
        s.start_training().unwrap();

        s.advance(Duration::MAX);
        s.advance(Duration::from_secs(1));
        assert_eq!(s.now(), Duration::MAX);
        assert_eq!(s.surface().progress_pct, 100);
        assert_eq!(s.page_phase(), PagePhase::Settled);
    }

    #[test]
    fn completion_notice_without_selection() {
        assert_eq!(completion_notice("Training", None), "Training completed!");
        assert_eq!(
            completion_notice("Simulation", Some("Flat")),
            "Simulation completed for Flat!"
        );
    }

    #[test]
    fn activity_records_user_visible_events() {
        let mut s = on_dashboard();
        s.toggle_theme().unwrap();
        let kinds: Vec<_> = s.drain_activity().into_iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ActivityKind::InitSucceeded,
                ActivityKind::Navigated,
                ActivityKind::ThemeChanged
            ]
        );
        assert!(s.drain_activity().is_empty());
    }
}
