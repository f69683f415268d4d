//! Activity reporter: per-event aggregation for `fraudwatch history`.

use std::collections::HashMap;

use super::logger::{ActivityEntry, Outcome};

/// Aggregated counts for one event kind.
#[derive(Debug, Clone, PartialEq)]
pub struct EventStat {
    pub event: String,
    pub count: usize,
    pub failures: usize,
    /// Mean duration over the entries that recorded one.
    pub avg_duration_ms: Option<u64>,
    pub last_seen: String,
}

impl EventStat {
    pub fn failure_pct(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            (self.failures as f64 / self.count as f64) * 100.0
        }
    }
}

/// Group entries by event, most frequent first.
pub fn summarize(entries: &[ActivityEntry]) -> Vec<EventStat> {
    #[derive(Default)]
    struct Acc {
        count: usize,
        failures: usize,
        duration_total: u64,
        duration_samples: u64,
        last_seen: String,
    }

    let mut by_event: HashMap<&str, Acc> = HashMap::new();
    for entry in entries {
        let acc = by_event.entry(entry.event.as_str()).or_default();
        acc.count += 1;
        if entry.outcome == Outcome::Failed {
            acc.failures += 1;
        }
        if let Some(ms) = entry.duration_ms {
            acc.duration_total += ms;
            acc.duration_samples += 1;
        }
        if entry.timestamp > acc.last_seen {
            acc.last_seen = entry.timestamp.clone();
        }
    }

    let mut stats: Vec<EventStat> = by_event
        .into_iter()
        .map(|(event, acc)| EventStat {
            event: event.to_string(),
            count: acc.count,
            failures: acc.failures,
            avg_duration_ms: (acc.duration_samples > 0)
                .then(|| acc.duration_total / acc.duration_samples),
            last_seen: acc.last_seen,
        })
        .collect();

    stats.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.event.cmp(&b.event)));
    stats
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
