//! Persisted per-symbol action records.
//!
//! The store guarantees at most one action per (symbol, bar, signal)
//! triple across process restarts. It knows nothing about order success;
//! callers record an action only after a submission succeeds, so a failed
//! order leaves the guard open for the next cycle.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use cadence_core::error::StateError;
use cadence_core::types::Signal;

const STATE_FILE: &str = "acted.json";

/// The last acted-upon bar for one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupRecord {
    /// Date of the bar the action was taken on
    pub date: NaiveDate,
    /// Signal that triggered the action
    pub signal: Signal,
}

/// Durable symbol -> record map backed by a JSON file.
#[derive(Debug)]
pub struct DedupStore {
    path: PathBuf,
    records: HashMap<String, DedupRecord>,
}

impl DedupStore {
    /// Open the store in a state directory, creating the directory when
    /// missing. A missing state file starts an empty store.
    pub fn open(dir: &Path) -> Result<Self, StateError> {
        fs::create_dir_all(dir)?;
        let path = dir.join(STATE_FILE);

        let records = if path.is_file() {
            let raw = fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            HashMap::new()
        };

        Ok(Self { path, records })
    }

    /// Whether an actionable signal on this bar is still unacted.
    ///
    /// Returns false only when the stored record for the symbol exactly
    /// matches (date, signal); a different date, a different signal, or
    /// no record at all returns true. Read-only and idempotent.
    pub fn should_act(&self, symbol: &str, date: NaiveDate, signal: Signal) -> bool {
        match self.records.get(symbol) {
            Some(record) => record.date != date || record.signal != signal,
            None => true,
        }
    }

    /// Record a completed action and persist the store.
    ///
    /// Overwrites any prior record for the symbol; records are never
    /// deleted here.
    pub fn record_action(
        &mut self,
        symbol: &str,
        date: NaiveDate,
        signal: Signal,
    ) -> Result<(), StateError> {
        self.records
            .insert(symbol.to_string(), DedupRecord { date, signal });
        self.persist()?;
        debug!(symbol, %date, %signal, "recorded action");
        Ok(())
    }

    /// Stored record for a symbol, if any.
    pub fn record(&self, symbol: &str) -> Option<&DedupRecord> {
        self.records.get(symbol)
    }

    /// Number of symbols with a record.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the store has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    // Write to a temp file in the same directory, then rename over the
    // state file so a crash mid-write cannot corrupt it.
    fn persist(&self) -> Result<(), StateError> {
        let tmp = self.path.with_extension("json.tmp");
        let raw = serde_json::to_string_pretty(&self.records)?;
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[test]
    fn test_empty_store_allows_everything() {
        let dir = TempDir::new().unwrap();
        let store = DedupStore::open(dir.path()).unwrap();

        assert!(store.is_empty());
        assert!(store.should_act("SPY", d(1), Signal::Buy));
        assert!(store.should_act("SPY", d(1), Signal::Sell));
    }

    #[test]
    fn test_should_act_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let mut store = DedupStore::open(dir.path()).unwrap();
        store.record_action("SPY", d(1), Signal::Buy).unwrap();

        let first = store.should_act("SPY", d(1), Signal::Buy);
        let second = store.should_act("SPY", d(1), Signal::Buy);
        assert_eq!(first, second);
        assert!(!first);
    }

    #[test]
    fn test_exact_match_only_suppresses() {
        let dir = TempDir::new().unwrap();
        let mut store = DedupStore::open(dir.path()).unwrap();
        store.record_action("SPY", d(1), Signal::Buy).unwrap();

        assert!(!store.should_act("SPY", d(1), Signal::Buy));
        assert!(store.should_act("SPY", d(1), Signal::Sell));
        assert!(store.should_act("SPY", d(2), Signal::Buy));
        assert!(store.should_act("QQQ", d(1), Signal::Buy));
    }

    #[test]
    fn test_record_overwrites() {
        let dir = TempDir::new().unwrap();
        let mut store = DedupStore::open(dir.path()).unwrap();
        store.record_action("SPY", d(1), Signal::Buy).unwrap();
        store.record_action("SPY", d(5), Signal::Sell).unwrap();

        assert_eq!(store.len(), 1);
        assert!(store.should_act("SPY", d(1), Signal::Buy));
        assert!(!store.should_act("SPY", d(5), Signal::Sell));
    }

    #[test]
    fn test_survives_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let mut store = DedupStore::open(dir.path()).unwrap();
            store.record_action("SPY", d(1), Signal::Buy).unwrap();
            store.record_action("QQQ", d(2), Signal::Sell).unwrap();
        }

        let store = DedupStore::open(dir.path()).unwrap();
        assert_eq!(store.len(), 2);
        assert!(!store.should_act("SPY", d(1), Signal::Buy));
        assert!(!store.should_act("QQQ", d(2), Signal::Sell));
        assert!(store.should_act("SPY", d(2), Signal::Buy));
    }

    #[test]
    fn test_creates_state_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("state").join("bot");
        let store = DedupStore::open(&nested).unwrap();
        assert!(store.is_empty());
        assert!(nested.is_dir());
    }
}
