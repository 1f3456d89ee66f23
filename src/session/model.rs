//! Persisted session record and home topology.
//!
//! `SessionState` is written as one JSON document under a single store key.
//! Field names follow the dashboard's camel-case record (`homesCount`,
//! `devicesCount`); the snake-case spellings written by older front-ends are
//! accepted on read.

use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Colour theme preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Self::Dark
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Light => write!(f, "light"),
            Self::Dark => write!(f, "dark"),
        }
    }
}

/// User preferences stored with the session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub theme: Theme,
}

/// A room and the devices installed in it.
///
/// Device names may repeat within a room. Unknown fields from the backend are
/// kept in `extra` so the record round-trips unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Room {
    #[serde(default)]
    pub devices: Vec<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A home: named rooms plus whatever else the backend attaches
/// (e.g. `comfort_range`). Rooms keep the order the backend sent them in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Home {
    #[serde(default)]
    pub rooms: IndexMap<String, Room>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Home name → home, in payload order.
pub type Homes = IndexMap<String, Home>;

/// The persisted session record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    #[serde(default)]
    pub initialized: bool,
    #[serde(default, alias = "homes_count")]
    pub homes_count: u64,
    #[serde(default, alias = "devices_count")]
    pub devices_count: u64,
    #[serde(default)]
    pub settings: Settings,
    /// `None` until the initialization call has completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homes: Option<Homes>,
}

impl SessionState {
    /// Homes known to the session; empty before initialization.
    pub fn homes(&self) -> &Homes {
        static EMPTY: LazyLock<Homes> = LazyLock::new(Homes::new);
        self.homes.as_ref().unwrap_or(&*EMPTY)
    }

    /// Home names in selector order.
    pub fn home_names(&self) -> Vec<String> {
        self.homes().keys().cloned().collect()
    }

    /// Every device name across all rooms of all homes, first occurrence
    /// first, with duplicates removed.
    pub fn device_names(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut names = Vec::new();
        let devices = self
            .homes()
            .values()
            .flat_map(|home| home.rooms.values())
            .flat_map(|room| room.devices.iter());
        for device in devices {
            if seen.insert(device.as_str()) {
                names.push(device.clone());
            }
        }
        names
    }

    /// Recount devices from the topology (duplicates included).
    ///
    /// `devices_count` is taken from the backend and may drift from this.
    pub fn device_total(&self) -> u64 {
        self.homes()
            .values()
            .flat_map(|home| home.rooms.values())
            .map(|room| room.devices.len() as u64)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(devices: &[&str]) -> Room {
        Room {
            devices: devices.iter().map(|d| d.to_string()).collect(),
            extra: Default::default(),
        }
    }

    fn sample_state() -> SessionState {
        let mut a = Home::default();
        a.rooms.insert("Kitchen".into(), room(&["Fridge", "Oven", "Fridge"]));
        a.rooms.insert("Living".into(), room(&["TV", "Lamp"]));
        let mut b = Home::default();
        b.rooms.insert("Office".into(), room(&["Lamp", "Heater"]));

        SessionState {
            initialized: true,
            homes_count: 2,
            devices_count: 7,
            homes: Some(IndexMap::from([("A".into(), a), ("B".into(), b)])),
            ..Default::default()
        }
    }

    #[test]
    fn default_state_is_uninitialized_light() {
        let state = SessionState::default();
        assert!(!state.initialized);
        assert_eq!(state.homes_count, 0);
        assert_eq!(state.devices_count, 0);
        assert_eq!(state.settings.theme, Theme::Light);
        assert!(state.homes.is_none());
        assert!(state.home_names().is_empty());
        assert!(state.device_names().is_empty());
    }

    #[test]
    fn device_names_are_deduplicated_across_homes() {
        let names = sample_state().device_names();
        assert_eq!(names, vec!["Fridge", "Oven", "TV", "Lamp", "Heater"]);
    }

    #[test]
    fn device_total_counts_duplicates() {
        assert_eq!(sample_state().device_total(), 7);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let json = serde_json::to_value(SessionState::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "initialized": false,
                "homesCount": 0,
                "devicesCount": 0,
                "settings": { "theme": "light" }
            })
        );
    }

    #[test]
    fn accepts_snake_case_counts() {
        let state: SessionState = serde_json::from_str(
            r#"{"initialized":true,"homes_count":3,"devices_count":9,"settings":{"theme":"dark"}}"#,
        )
        .unwrap();
        assert_eq!(state.homes_count, 3);
        assert_eq!(state.devices_count, 9);
        assert_eq!(state.settings.theme, Theme::Dark);
    }

    #[test]
    fn unknown_home_fields_round_trip() {
        let raw = serde_json::json!({
            "initialized": true,
            "homesCount": 1,
            "devicesCount": 1,
            "settings": { "theme": "light" },
            "homes": {
                "Cottage": {
                    "comfort_range": [21, 25],
                    "rooms": { "Den": { "devices": ["Lamp"], "floor": 1 } }
                }
            }
        });
        let state: SessionState = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&state).unwrap(), raw);
    }

    #[test]
    fn theme_toggles_both_ways() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Dark.to_string(), "dark");
    }
}
