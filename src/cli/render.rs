//! Terminal rendering of a session's visible page.

use colored::{ColoredString, Colorize};
use hemdash::api::InitClient;
use hemdash::session::{
    DEVICE_OPTIONS, HOME_OPTIONS, PagePhase, Selector, SelectorId, Session, Surface, View,
};
use hemdash::store::KeyValueStore;

const WIDTH: usize = 60;

/// Print the header and whatever page is currently shown.
pub fn render<S: KeyValueStore, C: InitClient>(session: &Session<S, C>) {
    let surface = session.surface();
    print_header(surface);

    match session.view() {
        View::Welcome => print_welcome(surface),
        View::Dashboard => print_dashboard(surface),
        View::ManageHomes => {
            print_title("Manage Homes");
            print_selector("Home", session.selector(SelectorId::Home));
            print_tiles(&HOME_OPTIONS);
        }
        View::ManageDevices => {
            print_title("Manage Devices");
            print_selector("Home", session.selector(SelectorId::DeviceHome));
            print_selector("Device", session.selector(SelectorId::Device));
            print_tiles(&DEVICE_OPTIONS);
        }
        View::Train => print_train(session),
    }

    if session.page_phase() == PagePhase::Entering {
        println!("  {}", "…".dimmed());
    }
    println!();
}

/// Print queued notices, one per line.
pub fn print_notices(notices: &[String]) {
    for notice in notices {
        println!("{} {}", "!".yellow().bold(), notice);
    }
}

fn print_header(surface: &Surface) {
    let theme = if surface.dark_mode { "dark" } else { "light" };
    let status = if surface.system_status_active {
        surface.system_status.green()
    } else {
        surface.system_status.dimmed()
    };
    println!("{}", "=".repeat(WIDTH));
    println!(
        "{}  {}  {} {}",
        accent("Home Energy Management", surface.dark_mode).bold(),
        surface.current_date.dimmed(),
        status,
        format!("[{theme}]").dimmed()
    );
    println!("{}", "=".repeat(WIDTH));
}

fn print_welcome(surface: &Surface) {
    println!("  Welcome! Initialize the system to get started.");
    if !surface.init_status.is_empty() {
        println!("  {}", surface.init_status);
    }
    if surface.init_loader_visible {
        println!("  {}", "Loading...".dimmed());
    }
    if surface.welcome_button_visible {
        println!("  {}", "[init] Initialize System".bold());
    }
}

fn print_dashboard(surface: &Surface) {
    print_title("Dashboard");
    println!("  {:<18} {}", "Devices:".bold(), surface.devices_count);
    println!("  {:<18} {}", "Homes:".bold(), surface.homes_count);
    println!("  {:<18} {} kWh", "Energy saved:".bold(), surface.kwh_saved);
    println!("  {:<18} {}", "Money saved:".bold(), surface.money_text());

    let status = if surface.optimization_active {
        surface.optimization_status.green()
    } else {
        surface.optimization_status.normal()
    };
    println!("  {:<18} {}", "Optimization:".bold(), status);
    println!();
    println!(
        "  [optimize] {}   [open homes|devices|train]",
        surface.optimization_button.label
    );
}

fn print_train<S: KeyValueStore, C: InitClient>(session: &Session<S, C>) {
    let surface = session.surface();
    print_title("Train");
    print_selector("Home", session.selector(SelectorId::TrainHome));
    println!(
        "  {} {}",
        progress_bar(surface.progress_pct),
        surface.progress_text()
    );
    println!("  {:<18} {}", "Expected savings:".bold(), surface.savings_label);
    println!();
    println!(
        "  [train] {}   [simulate] {}",
        button_label(&surface.train_button.label, surface.train_button.disabled),
        button_label(
            &surface.simulate_button.label,
            surface.simulate_button.disabled
        )
    );
}

fn print_title(title: &str) {
    println!("{}", title.bold().cyan());
}

fn print_selector(name: &str, selector: &Selector) {
    let selected = selector.selected();
    let options: Vec<String> = selector
        .options()
        .iter()
        .map(|option| {
            if Some(option.as_str()) == selected {
                format!("[{option}]").bold().to_string()
            } else {
                option.clone()
            }
        })
        .collect();

    if options.is_empty() {
        println!("  {:<10} {}", format!("{name}:").bold(), "(none)".dimmed());
    } else {
        println!("  {:<10} {}", format!("{name}:").bold(), options.join("  "));
    }
}

fn print_tiles(tiles: &[&str]) {
    println!("  {}", "Options:".bold());
    for tile in tiles {
        println!("    · {tile}");
    }
}

fn button_label(label: &str, disabled: bool) -> ColoredString {
    if disabled {
        label.dimmed()
    } else {
        label.normal()
    }
}

fn accent(text: &str, dark: bool) -> ColoredString {
    if dark { text.magenta() } else { text.cyan() }
}

/// A 20-cell progress bar.
pub fn progress_bar(pct: u8) -> String {
    let filled = usize::from(pct.min(100)) / 5;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(20 - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0), format!("[{}]", "-".repeat(20)));
        assert_eq!(progress_bar(100), format!("[{}]", "#".repeat(20)));
        assert_eq!(
            progress_bar(42),
            format!("[{}{}]", "#".repeat(8), "-".repeat(12))
        );
        assert_eq!(progress_bar(250), progress_bar(100));
    }
}
