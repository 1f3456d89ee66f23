//! Activity journal — user-visible session events as JSON lines.
//!
//! The session queues an [`ActivityEvent`] for everything a user would
//! notice (initialization, theme changes, page changes, simulated runs).
//! Front-ends drain the queue and append it to `~/.hemdash/activity.jsonl`
//! with a timestamp; `hemdash history` reads it back.
//!
//! Writing is best-effort from the session's point of view: a journal
//! failure never affects the dashboard.

use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::schema::{LoggingConfig, expand_home};

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    InitSucceeded,
    InitFailed,
    SessionReloaded,
    ThemeChanged,
    Navigated,
    Selected,
    OptimizationStarted,
    OptimizationStopped,
    TrainingCompleted,
    SimulationCompleted,
}

/// A session event before it is stamped and written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub kind: ActivityKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ActivityEvent {
    pub fn new(kind: ActivityKind) -> Self {
        Self { kind, detail: None }
    }

    pub fn with_detail(kind: ActivityKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: Some(detail.into()),
        }
    }
}

/// One line of the journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub timestamp: String,
    #[serde(flatten)]
    pub event: ActivityEvent,
}

/// Journal location, or `None` when the journal is switched off.
pub fn journal_path(config: &LoggingConfig) -> Option<PathBuf> {
    config
        .activity_log
        .then(|| expand_home(&config.activity_path))
}

/// Append `events` to the journal at `path`, stamped with the current time.
pub fn append_events(path: &Path, events: &[ActivityEvent]) -> Result<()> {
    if events.is_empty() {
        return Ok(());
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let timestamp = Utc::now().to_rfc3339();
    for event in events {
        let entry = ActivityEntry {
            timestamp: timestamp.clone(),
            event: event.clone(),
        };
        writeln!(file, "{}", serde_json::to_string(&entry)?)?;
    }

    Ok(())
}

/// Append, logging instead of failing.
pub fn record(path: Option<&Path>, events: &[ActivityEvent]) {
    let Some(path) = path else {
        return;
    };
    if let Err(e) = append_events(path, events) {
        log::warn!("could not write activity journal {}: {e}", path.display());
    }
}

/// Read the last `limit` entries, oldest first.
///
/// Malformed lines are skipped; a missing journal reads as empty.
pub fn read_recent(path: &Path, limit: usize) -> Vec<ActivityEntry> {
    let Ok(file) = fs::File::open(path) else {
        return Vec::new();
    };

    let entries: Vec<ActivityEntry> = BufReader::new(file)
        .lines()
        .map_while(|line| line.ok())
        .filter_map(|line| serde_json::from_str(&line).ok())
        .collect();

    let skip = entries.len().saturating_sub(limit);
    entries.into_iter().skip(skip).collect()
}
