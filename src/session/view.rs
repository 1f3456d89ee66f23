//! Screens and the navigation state machine.
//!
//! Exactly one screen is visible at a time. Sub-pages hang off the dashboard
//! and "back" always returns to it; there is no history stack. The welcome
//! screen is left only through the initialize flow.

use std::fmt;

/// The five mutually exclusive screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Welcome,
    Dashboard,
    ManageHomes,
    ManageDevices,
    Train,
}

impl View {
    pub const ALL: [View; 5] = [
        View::Welcome,
        View::Dashboard,
        View::ManageHomes,
        View::ManageDevices,
        View::Train,
    ];

    /// Element id of the screen in the page markup.
    pub fn element_id(self) -> &'static str {
        match self {
            Self::Welcome => "welcome-screen",
            Self::Dashboard => "main-dashboard",
            Self::ManageHomes => "manage-homes-page",
            Self::ManageDevices => "manage-devices-page",
            Self::Train => "train-page",
        }
    }

    /// Parse a screen name as typed at the dashboard prompt.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "welcome" => Some(Self::Welcome),
            "dashboard" | "home" | "main" => Some(Self::Dashboard),
            "homes" | "manage-homes" => Some(Self::ManageHomes),
            "devices" | "manage-devices" => Some(Self::ManageDevices),
            "train" | "training" => Some(Self::Train),
            _ => None,
        }
    }

    pub fn is_sub_page(self) -> bool {
        matches!(self, Self::ManageHomes | Self::ManageDevices | Self::Train)
    }

    /// Transitions a user can request directly. Welcome → Dashboard is not
    /// one of them.
    pub fn can_navigate(from: View, to: View) -> bool {
        match (from, to) {
            (View::Dashboard, to) => to.is_sub_page(),
            (from, View::Dashboard) => from.is_sub_page(),
            _ => false,
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Welcome => write!(f, "welcome"),
            Self::Dashboard => write!(f, "dashboard"),
            Self::ManageHomes => write!(f, "manage-homes"),
            Self::ManageDevices => write!(f, "manage-devices"),
            Self::Train => write!(f, "train"),
        }
    }
}

/// Progress of the fade/slide-in played when a screen is entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagePhase {
    /// Transparent and offset 20px down.
    Entering,
    /// Fully opaque at its resting position.
    Settled,
}

/// Which screen is visible and how far its entry animation has got.
#[derive(Debug, Clone)]
pub struct Navigation {
    current: View,
    phase: PagePhase,
}

impl Default for Navigation {
    fn default() -> Self {
        Self {
            current: View::Welcome,
            phase: PagePhase::Settled,
        }
    }
}

impl Navigation {
    pub fn current(&self) -> View {
        self.current
    }

    pub fn phase(&self) -> PagePhase {
        self.phase
    }

    /// Show `to`, hiding the current screen, and start its entry animation.
    pub(crate) fn enter(&mut self, to: View) -> View {
        let from = self.current;
        self.current = to;
        self.phase = PagePhase::Entering;
        from
    }

    /// Finish the entry animation of `view` if it is still the visible one.
    pub(crate) fn settle(&mut self, view: View) {
        if self.current == view {
            self.phase = PagePhase::Settled;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashboard_and_sub_pages_are_symmetric() {
        for page in [View::ManageHomes, View::ManageDevices, View::Train] {
            assert!(View::can_navigate(View::Dashboard, page));
            assert!(View::can_navigate(page, View::Dashboard));
        }
    }

    #[test]
    fn no_other_transitions_are_allowed() {
        assert!(!View::can_navigate(View::Welcome, View::Dashboard));
        assert!(!View::can_navigate(View::Dashboard, View::Welcome));
        assert!(!View::can_navigate(View::ManageHomes, View::Train));
        assert!(!View::can_navigate(View::Train, View::ManageDevices));
        for view in View::ALL {
            assert!(!View::can_navigate(view, view));
            assert!(!View::can_navigate(view, View::Welcome));
        }
    }

    #[test]
    fn entering_then_settling() {
        let mut nav = Navigation::default();
        assert_eq!(nav.current(), View::Welcome);

        assert_eq!(nav.enter(View::Dashboard), View::Welcome);
        assert_eq!(nav.phase(), PagePhase::Entering);

        // A stale settle for another screen is ignored.
        nav.settle(View::Train);
        assert_eq!(nav.phase(), PagePhase::Entering);

        nav.settle(View::Dashboard);
        assert_eq!(nav.phase(), PagePhase::Settled);
    }

    #[test]
    fn names_parse() {
        assert_eq!(View::from_name("Devices"), Some(View::ManageDevices));
        assert_eq!(View::from_name("train"), Some(View::Train));
        assert_eq!(View::from_name("attic"), None);
    }
}
