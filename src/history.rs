//! Session history of looked-up values (the chart view's lookup log).

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub time: DateTime<Utc>,
    pub value: f64,
}

/// Append-only, in-memory log. Appending returns a new log so a published
/// snapshot never changes under its readers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValueHistory {
    entries: Vec<HistoryEntry>,
}

impl ValueHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn appended(&self, entry: HistoryEntry) -> Self {
        let mut entries = Vec::with_capacity(self.entries.len() + 1);
        entries.extend(self.entries.iter().cloned());
        entries.push(entry);
        Self { entries }
    }

    /// Newest lookup time, `None` for an empty log.
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.entries.iter().map(|entry| entry.time).max()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
