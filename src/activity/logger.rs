use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::schema::{LoggingConfig, expand_tilde};

// ---------------------------------------------------------------------------
// Activity log entry (JSONL)
// ---------------------------------------------------------------------------

/// How a logged action ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Ok,
    Failed,
    Rejected,
    Cancelled,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Failed => write!(f, "failed"),
            Self::Rejected => write!(f, "rejected"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A single entry in `~/.fraudwatch/activity.jsonl`.
///
/// One line per user-visible action: login, registration, detection run,
/// dashboard close, admin load, export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub timestamp: String,
    pub event: String,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub duration_ms: Option<u64>,
}

// ---------------------------------------------------------------------------
// Log handle
// ---------------------------------------------------------------------------

/// Append-only activity log. All writes are best-effort: a log that cannot
/// be written never fails the action being logged.
#[derive(Debug, Clone, Default)]
pub struct ActivityLog {
    path: Option<PathBuf>,
}

impl ActivityLog {
    pub fn from_config(config: &LoggingConfig) -> Self {
        if !config.enabled {
            return Self::disabled();
        }
        Self {
            path: expand_tilde(&config.path),
        }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Log an action.
    pub fn record(
        &self,
        event: &str,
        outcome: Outcome,
        detail: Option<&str>,
        duration: Option<Duration>,
    ) {
        let entry = ActivityEntry {
            timestamp: Utc::now().to_rfc3339(),
            event: event.to_string(),
            outcome,
            detail: detail.map(str::to_string),
            duration_ms: duration.map(|d| d.as_millis() as u64),
        };
        let _ = self.append(&entry);
    }

    /// Read every entry. Malformed lines are skipped; a missing file is empty.
    pub fn read_all(&self) -> Vec<ActivityEntry> {
        let Some(path) = &self.path else {
            return Vec::new();
        };

        let Ok(file) = fs::File::open(path) else {
            return Vec::new();
        };

        BufReader::new(file)
            .lines()
            .map_while(Result::ok)
            .filter_map(|line| serde_json::from_str::<ActivityEntry>(&line).ok())
            .collect()
    }

    /// Entries from the last N days, or all of them when `days` is `None`.
    pub fn read_since_days(&self, days: Option<u32>) -> Vec<ActivityEntry> {
        let entries = self.read_all();

        let Some(days) = days else {
            return entries;
        };

        let cutoff = (Utc::now() - chrono::Duration::days(i64::from(days))).to_rfc3339();
        entries
            .into_iter()
            .filter(|e| e.timestamp >= cutoff)
            .collect()
    }

    fn append(&self, entry: &ActivityEntry) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        let json = serde_json::to_string(entry)?;
        writeln!(file, "{json}")?;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
