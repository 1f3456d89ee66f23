//! Drop-down selectors on the management and training pages.
//!
//! Each selector is filled once, the first time its page is shown, from the
//! session's home topology. Later changes to the topology do not refill it.

use std::fmt;

use super::model::SessionState;
use super::view::View;

/// The four list controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectorId {
    /// Homes on the manage-homes page.
    Home,
    /// Flattened device list on the manage-devices page.
    Device,
    /// Home filter on the manage-devices page.
    DeviceHome,
    /// Home to train on the train page.
    TrainHome,
}

impl SelectorId {
    pub const ALL: [SelectorId; 4] = [
        SelectorId::Home,
        SelectorId::Device,
        SelectorId::DeviceHome,
        SelectorId::TrainHome,
    ];

    pub fn element_id(self) -> &'static str {
        match self {
            Self::Home => "home-selector",
            Self::Device => "device-selector",
            Self::DeviceHome => "device-home-selector",
            Self::TrainHome => "train-home-selector",
        }
    }

    /// Page the selector lives on.
    pub fn page(self) -> View {
        match self {
            Self::Home => View::ManageHomes,
            Self::Device | Self::DeviceHome => View::ManageDevices,
            Self::TrainHome => View::Train,
        }
    }

    fn options_from(self, state: &SessionState) -> Vec<String> {
        match self {
            Self::Device => state.device_names(),
            Self::Home | Self::DeviceHome | Self::TrainHome => state.home_names(),
        }
    }
}

impl fmt::Display for SelectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.element_id())
    }
}

/// One drop-down: its options and the selected entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selector {
    options: Vec<String>,
    selected: Option<usize>,
    populated: bool,
}

impl Selector {
    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.map(|i| self.options[i].as_str())
    }

    pub fn is_populated(&self) -> bool {
        self.populated
    }

    /// Fill the options once. Like a native `<select>`, the first option
    /// starts out selected.
    fn populate(&mut self, options: Vec<String>) {
        if self.populated {
            return;
        }
        self.selected = if options.is_empty() { None } else { Some(0) };
        self.options = options;
        self.populated = true;
    }

    /// Select `option`, returning `false` if it is not in the list.
    fn select(&mut self, option: &str) -> bool {
        match self.options.iter().position(|o| o == option) {
            Some(index) => {
                self.selected = Some(index);
                true
            }
            None => false,
        }
    }
}

/// All four selectors.
#[derive(Debug, Clone, Default)]
pub struct Selectors {
    home: Selector,
    device: Selector,
    device_home: Selector,
    train_home: Selector,
}

impl Selectors {
    pub fn get(&self, id: SelectorId) -> &Selector {
        match id {
            SelectorId::Home => &self.home,
            SelectorId::Device => &self.device,
            SelectorId::DeviceHome => &self.device_home,
            SelectorId::TrainHome => &self.train_home,
        }
    }

    fn get_mut(&mut self, id: SelectorId) -> &mut Selector {
        match id {
            SelectorId::Home => &mut self.home,
            SelectorId::Device => &mut self.device,
            SelectorId::DeviceHome => &mut self.device_home,
            SelectorId::TrainHome => &mut self.train_home,
        }
    }

    /// Populate every selector on `page` that has not been populated yet.
    pub(crate) fn populate_page(&mut self, page: View, state: &SessionState) {
        for id in SelectorId::ALL.into_iter().filter(|id| id.page() == page) {
            let selector = self.get_mut(id);
            if !selector.is_populated() {
                selector.populate(id.options_from(state));
                log::debug!("populated {id} with {} options", selector.options.len());
            }
        }
    }

    pub(crate) fn select(&mut self, id: SelectorId, option: &str) -> bool {
        self.get_mut(id).select(option)
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::*;
    use crate::session::model::{Home, Room};

    fn state_with(homes: &[(&str, &[&str])]) -> SessionState {
        let homes = homes
            .iter()
            .map(|(name, devices)| {
                let mut home = Home::default();
                home.rooms.insert(
                    "Main".to_string(),
                    Room {
                        devices: devices.iter().map(|d| d.to_string()).collect(),
                        extra: Default::default(),
                    },
                );
                (name.to_string(), home)
            })
            .collect::<IndexMap<_, _>>();
        SessionState {
            initialized: true,
            homes: Some(homes),
            ..Default::default()
        }
    }

    #[test]
    fn page_population_fills_only_that_page() {
        let state = state_with(&[("A", &["Lamp"]), ("B", &["Lamp", "Heater"])]);
        let mut selectors = Selectors::default();

        selectors.populate_page(View::ManageDevices, &state);
        assert_eq!(selectors.get(SelectorId::Device).options(), ["Lamp", "Heater"]);
        assert_eq!(selectors.get(SelectorId::DeviceHome).options(), ["A", "B"]);
        assert!(!selectors.get(SelectorId::Home).is_populated());
        assert!(!selectors.get(SelectorId::TrainHome).is_populated());
    }

    #[test]
    fn population_happens_once() {
        let mut selectors = Selectors::default();
        selectors.populate_page(View::ManageHomes, &state_with(&[("A", &[])]));
        selectors.populate_page(View::ManageHomes, &state_with(&[("A", &[]), ("B", &[])]));
        assert_eq!(selectors.get(SelectorId::Home).options(), ["A"]);
    }

    #[test]
    fn first_option_starts_selected() {
        let mut selectors = Selectors::default();
        selectors.populate_page(View::Train, &state_with(&[("A", &[]), ("B", &[])]));
        assert_eq!(selectors.get(SelectorId::TrainHome).selected(), Some("A"));

        assert!(selectors.select(SelectorId::TrainHome, "B"));
        assert_eq!(selectors.get(SelectorId::TrainHome).selected(), Some("B"));
        assert!(!selectors.select(SelectorId::TrainHome, "C"));
        assert_eq!(selectors.get(SelectorId::TrainHome).selected(), Some("B"));
    }

    #[test]
    fn uninitialized_state_gives_empty_selectors() {
        let mut selectors = Selectors::default();
        selectors.populate_page(View::Train, &SessionState::default());
        let train = selectors.get(SelectorId::TrainHome);
        assert!(train.is_populated());
        assert!(train.options().is_empty());
        assert_eq!(train.selected(), None);
    }
}
