//! High score leaderboard system
//!
//! Tracks the top 5 runs. Persisted as a single string value of
//! comma-separated `score:wave` pairs, e.g. `"120:3,40:1"`.

use std::cmp::Reverse;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, StoreError};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 5;

/// A single high score entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreRecord {
    pub score: u32,
    /// Wave reached
    pub wave: u32,
}

impl HighScoreRecord {
    pub const fn new(score: u32, wave: u32) -> Self {
        Self { score, wave }
    }
}

/// High score leaderboard, ordered by score then wave, best first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreRecord>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Parse the stored string. Malformed entries are skipped and the
    /// result is ordered and trimmed like a saved board.
    pub fn decode(raw: &str) -> Self {
        if raw.is_empty() {
            return Self::new();
        }
        let mut entries: Vec<HighScoreRecord> = raw
            .split(',')
            .filter_map(|entry| {
                let mut parts = entry.split(':');
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(score), Some(wave), None) => Some(HighScoreRecord::new(
                        score.parse().ok()?,
                        wave.parse().ok()?,
                    )),
                    _ => None,
                }
            })
            .collect();
        sort_entries(&mut entries);
        entries.truncate(MAX_HIGH_SCORES);
        Self { entries }
    }

    /// Stored string form
    pub fn encode(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("{}:{}", e.score, e.wave))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Add a run, re-sort and trim.
    /// Returns the rank achieved (1-indexed) or None if it fell off the board.
    pub fn add_score(&mut self, score: u32, wave: u32) -> Option<usize> {
        let record = HighScoreRecord::new(score, wave);
        self.entries.push(record);
        sort_entries(&mut self.entries);
        // Stable sort leaves the new run after every equal earlier one
        let index = self.entries.iter().rposition(|e| *e == record);
        self.entries.truncate(MAX_HIGH_SCORES);

        index.filter(|&i| i < MAX_HIGH_SCORES).map(|i| i + 1)
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }
}

/// Best first; stable, so equal earlier runs keep their place
fn sort_entries(entries: &mut [HighScoreRecord]) {
    entries.sort_by_key(|e| (Reverse(e.score), Reverse(e.wave)));
}

/// Destination for finished runs
pub trait ScoreStore: Send + Sync {
    fn save(&self, score: u32, wave: u32) -> Result<Option<usize>, StoreError>;
    fn load(&self) -> Result<HighScores, StoreError>;
}

/// Score ledger backed by a key-value store
pub struct ScoreLedger {
    store: Arc<dyn KeyValueStore>,
}

impl ScoreLedger {
    /// Key the encoded leaderboard lives under
    pub const STORAGE_KEY: &'static str = "scores";

    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

impl ScoreStore for ScoreLedger {
    fn save(&self, score: u32, wave: u32) -> Result<Option<usize>, StoreError> {
        let mut scores = self.load()?;
        let rank = scores.add_score(score, wave);
        self.store.set(Self::STORAGE_KEY, &scores.encode())?;
        log::info!(
            "High scores saved ({} entries, rank {:?})",
            scores.entries.len(),
            rank
        );
        Ok(rank)
    }

    fn load(&self) -> Result<HighScores, StoreError> {
        let raw = self.store.get(Self::STORAGE_KEY)?.unwrap_or_default();
        Ok(HighScores::decode(&raw))
    }
}
