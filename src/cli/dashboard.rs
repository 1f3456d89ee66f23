//! Interactive terminal dashboard.
//!
//! Reads one command per line from stdin and drives a [`Session`] with it.
//! Before each command the session is advanced by the wall-clock time that
//! passed since the previous one, so the simulated timers run at real speed
//! while the user types.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Result, bail};
use colored::Colorize;
use hemdash::activity;
use hemdash::api::InitClient;
use hemdash::session::{InitOutcome, ProcessStart, SelectorId, Session, View};
use hemdash::store::KeyValueStore;

use super::render;

/// Longest pause `wait` accepts.
const MAX_WAIT: Duration = Duration::from_secs(24 * 60 * 60);

/// One line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Show,
    Init,
    Theme,
    Open(View),
    Back,
    Select(SelectorId, String),
    Option(String),
    Optimize,
    Train,
    Simulate,
    Wait(Duration),
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "help" | "?" => Self::Help,
            "show" | "" => Self::Show,
            "init" | "initialize" => Self::Init,
            "theme" => Self::Theme,
            "open" | "go" => match View::from_name(rest) {
                Some(view) => Self::Open(view),
                None => bail!("unknown page '{rest}' (try: homes, devices, train)"),
            },
            "back" => Self::Back,
            "select" => {
                let Some((name, option)) = rest.split_once(char::is_whitespace) else {
                    bail!("usage: select <home|device|device-home|train-home> <option>");
                };
                let Some(id) = selector_from_name(name) else {
                    bail!("unknown selector '{name}'");
                };
                Self::Select(id, option.trim().to_string())
            }
            "option" => {
                if rest.is_empty() {
                    bail!("usage: option <name>");
                }
                Self::Option(rest.to_string())
            }
            "optimize" => Self::Optimize,
            "train" => Self::Train,
            "simulate" => Self::Simulate,
            "wait" => {
                let secs: f64 = rest.parse().map_err(|_| {
                    anyhow::anyhow!("usage: wait <seconds>")
                })?;
                match Duration::try_from_secs_f64(secs) {
                    Ok(duration) if duration <= MAX_WAIT => Self::Wait(duration),
                    _ => bail!(
                        "wait needs between 0 and {} seconds",
                        MAX_WAIT.as_secs()
                    ),
                }
            }
            "quit" | "exit" | "q" => Self::Quit,
            other => bail!("unknown command '{other}' (type 'help')"),
        };

        Ok(command)
    }
}

fn selector_from_name(name: &str) -> Option<SelectorId> {
    let name = name.to_ascii_lowercase();
    let name = name.trim_end_matches("-selector");
    match name {
        "home" => Some(SelectorId::Home),
        "device" => Some(SelectorId::Device),
        "device-home" => Some(SelectorId::DeviceHome),
        "train-home" | "train" => Some(SelectorId::TrainHome),
        _ => None,
    }
}

/// Run the prompt loop until `quit` or end of input.
pub fn run<S: KeyValueStore, C: InitClient>(
    session: &mut Session<S, C>,
    journal: Option<PathBuf>,
) -> Result<()> {
    print_help();
    render::render(session);

    let stdin = io::stdin();
    let mut last = Instant::now();

    loop {
        print!("{} ", "hemdash>".bold().green());
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let now = Instant::now();
        session.advance(now - last);
        last = now;

        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("{} {e}", "error:".red().bold());
                continue;
            }
        };

        if command == Command::Quit {
            break;
        }

        if let Err(e) = execute(session, &command) {
            println!("{} {e}", "error:".red().bold());
        }
        // `init` and `wait` already advanced the session while sleeping.
        last = Instant::now();

        render::print_notices(&session.take_notices());
        activity::record(journal.as_deref(), &session.drain_activity());
        if !matches!(command, Command::Help) {
            render::render(session);
        }
    }

    activity::record(journal.as_deref(), &session.drain_activity());
    Ok(())
}

fn execute<S: KeyValueStore, C: InitClient>(
    session: &mut Session<S, C>,
    command: &Command,
) -> Result<()> {
    match command {
        Command::Help => print_help(),
        Command::Show | Command::Quit => {}
        Command::Init => {
            if session.initialize()? == InitOutcome::AlreadyInFlight {
                println!("{}", "Already initializing.".dimmed());
            }
            println!("{}", session.surface().init_status);
            super::wait_for_dashboard(session);
        }
        Command::Theme => {
            let theme = session.toggle_theme()?;
            println!("Theme: {}", theme.to_string().bold());
        }
        Command::Open(view) => session.navigate(*view)?,
        Command::Back => session.back_to_dashboard()?,
        Command::Select(id, option) => session.select(*id, option)?,
        Command::Option(name) => session.choose_option(name)?,
        Command::Optimize => {
            session.toggle_optimization()?;
        }
        Command::Train => {
            if session.start_training()? == ProcessStart::Busy {
                println!("{}", "Training is already running.".dimmed());
            }
        }
        Command::Simulate => {
            if session.run_simulation()? == ProcessStart::Busy {
                println!("{}", "A simulation is already running.".dimmed());
            }
        }
        Command::Wait(duration) => {
            thread::sleep(*duration);
            session.advance(*duration);
        }
    }
    Ok(())
}

fn print_help() {
    println!("{}", "Commands".bold().cyan());
    let rows = [
        ("init", "initialize the system (welcome screen)"),
        ("theme", "toggle light/dark"),
        ("open <homes|devices|train>", "open a page from the dashboard"),
        ("back", "return to the dashboard"),
        ("select <selector> <option>", "home, device, device-home, train-home"),
        ("option <name>", "activate a management option"),
        ("optimize", "start/stop home optimization"),
        ("train | simulate", "run training or a simulation"),
        ("wait <seconds>", "let time pass"),
        ("show | help | quit", ""),
    ];
    for (cmd, what) in rows {
        println!("  {:<30} {}", cmd, what.dimmed());
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("  init ").unwrap(), Command::Init);
        assert_eq!(Command::parse("").unwrap(), Command::Show);
        assert_eq!(
            Command::parse("open Train").unwrap(),
            Command::Open(View::Train)
        );
        assert_eq!(
            Command::parse("select train-home Lakeside Cottage").unwrap(),
            Command::Select(SelectorId::TrainHome, "Lakeside Cottage".to_string())
        );
        assert_eq!(
            Command::parse("select device-selector TV").unwrap(),
            Command::Select(SelectorId::Device, "TV".to_string())
        );
        assert_eq!(
            Command::parse("option Add Room").unwrap(),
            Command::Option("Add Room".to_string())
        );
        assert_eq!(
            Command::parse("wait 2.5").unwrap(),
            Command::Wait(Duration::from_millis(2500))
        );
        assert_eq!(Command::parse("wait 86400").unwrap(), Command::Wait(MAX_WAIT));
        assert_eq!(Command::parse("exit").unwrap(), Command::Quit);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(Command::parse("open garage").is_err());
        assert!(Command::parse("select home").is_err());
        assert!(Command::parse("select pool Deep End").is_err());
        assert!(Command::parse("wait -1").is_err());
        assert!(Command::parse("wait soon").is_err());
        assert!(Command::parse("wait NaN").is_err());
        assert!(Command::parse("wait 1e300").is_err());
        assert!(Command::parse("wait 86401").is_err());
        assert!(Command::parse("dance").is_err());
    }
}
