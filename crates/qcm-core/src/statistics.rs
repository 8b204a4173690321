//! Persisted per-lesson and per-exam running totals.
//!
//! The statistics file is a JSON object keyed by `module/lesson` or
//! `module/Exam-N`; each value holds `attempts`, `correct` and `total`.
//! Entries that do not have that shape are dropped on load, and a file that
//! cannot be read at all is treated as empty.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::loader::write_atomic;
use crate::traits::StatsStore;

/// Running totals for one key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsEntry {
    /// Completed sessions.
    pub attempts: u64,
    /// Questions answered with a perfect score.
    pub correct: u64,
    /// Questions seen across all attempts.
    pub total: u64,
}

impl StatsEntry {
    /// Fold one finished session into the totals.
    pub fn record(&mut self, scores: &[f64]) {
        self.attempts += 1;
        self.correct += scores.iter().filter(|&&s| s == 1.0).count() as u64;
        self.total += scores.len() as u64;
    }

    /// Share of perfectly answered questions, in percent.
    pub fn average_percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64 * 100.0
        }
    }
}

/// All statistics, keyed by stats key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatsBook {
    entries: BTreeMap<String, StatsEntry>,
}

impl StatsBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a statistics document, keeping only well-formed entries.
    pub fn from_json_lenient(content: &str) -> Self {
        let Ok(serde_json::Value::Object(map)) = serde_json::from_str(content) else {
            return Self::default();
        };

        let entries = map
            .into_iter()
            .filter_map(|(key, value)| match serde_json::from_value::<StatsEntry>(value) {
                Ok(entry) => Some((key, entry)),
                Err(e) => {
                    tracing::warn!("dropping statistics entry {key}: {e}");
                    None
                }
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&StatsEntry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fold a session into the entry for `key`, creating it if needed.
    pub fn record(&mut self, key: &str, scores: &[f64]) -> StatsEntry {
        let entry = self.entries.entry(key.to_string()).or_default();
        entry.record(scores);
        *entry
    }

    /// Display rows sorted by key.
    pub fn rows(&self) -> Vec<StatsRow> {
        self.entries
            .iter()
            .map(|(key, entry)| StatsRow {
                key: key.clone(),
                attempts: entry.attempts,
                total: entry.total,
                correct: entry.correct,
                average_percent: (entry.average_percent() * 100.0).round() / 100.0,
            })
            .collect()
    }
}

/// One line of the statistics listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsRow {
    pub key: String,
    pub attempts: u64,
    pub total: u64,
    pub correct: u64,
    /// Rounded to two decimals.
    pub average_percent: f64,
}

/// Statistics stored in a JSON file.
#[derive(Debug, Clone)]
pub struct JsonStatsFile {
    path: PathBuf,
}

impl JsonStatsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StatsStore for JsonStatsFile {
    fn load(&self) -> StatsBook {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => StatsBook::from_json_lenient(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StatsBook::default(),
            Err(e) => {
                tracing::warn!(
                    "cannot read statistics {}: {}; starting fresh",
                    self.path.display(),
                    e
                );
                StatsBook::default()
            }
        }
    }

    fn save(&self, book: &StatsBook) -> Result<()> {
        let mut json = serde_json::to_string_pretty(book).unwrap_or_else(|_| "{}".to_string());
        json.push('\n');
        write_atomic(&self.path, json.as_bytes())
    }
}

/// Load, update and persist the totals for one finished session.
///
/// Returns the updated entry. A failed write is reported as
/// `PersistenceWriteFailure`; the in-memory result is unaffected.
pub fn record_completion(
    store: &dyn StatsStore,
    key: &str,
    scores: &[f64],
) -> Result<StatsEntry> {
    let mut book = store.load();
    let entry = book.record(key, scores);
    store.save(&book)?;

    tracing::info!(
        "recorded {key}: {} attempt(s), {}/{} correct",
        entry.attempts,
        entry.correct,
        entry.total
    );
    Ok(entry)
}
