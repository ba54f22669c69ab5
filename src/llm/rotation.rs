//! Round-robin API key pool with a persisted rotation record.
//!
//! The record (`key-rotation.json`) holds the active index, the day it was
//! last reset and the pool size it was written for. Every read-modify-write
//! of the record happens under one mutex, so two concurrent requests never
//! start on the same slot.
//!
//! Rotation rules:
//! * a request starts at the active index, which is advanced at once so the
//!   next concurrent request starts one key further;
//! * a success moves the active index just past the key that succeeded;
//! * an exhausted pool resets the active index to 0;
//! * the first request of a new calendar day resets the index to 0.

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RotationRecord
// ---------------------------------------------------------------------------

/// Persisted rotation state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RotationRecord {
    pub active_index: usize,
    pub last_reset: Option<NaiveDate>,
    /// Size of the pool the index refers to; a different pool resets it.
    pub pool_size: usize,
}

// ---------------------------------------------------------------------------
// KeyPool
// ---------------------------------------------------------------------------

/// API keys tried round-robin, shared by every request of the process.
pub struct KeyPool {
    keys: Vec<String>,
    record: Mutex<RotationRecord>,
    path: Option<PathBuf>,
}

impl KeyPool {
    /// In-memory pool; rotation state is not persisted.
    pub fn new(keys: Vec<String>) -> Self {
        let keys = clean_keys(keys);
        let record = RotationRecord {
            pool_size: keys.len(),
            ..RotationRecord::default()
        };
        Self {
            keys,
            record: Mutex::new(record),
            path: None,
        }
    }

    /// Pool whose rotation state is loaded from and saved to `path`.
    ///
    /// A missing or unreadable record starts from index 0.
    pub fn load(keys: Vec<String>, path: PathBuf) -> Self {
        let keys = clean_keys(keys);
        let mut record = read_record(&path).unwrap_or_default();
        if record.pool_size != keys.len() || record.active_index >= keys.len().max(1) {
            log::debug!("rotation: pool changed, resetting active index");
            record.active_index = 0;
            record.pool_size = keys.len();
        }
        Self {
            keys,
            record: Mutex::new(record),
            path: Some(path),
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The key at `index`, wrapping around the pool.
    pub fn key(&self, index: usize) -> Option<&str> {
        if self.keys.is_empty() {
            return None;
        }
        self.keys.get(index % self.keys.len()).map(String::as_str)
    }

    /// Current active index (for logging and tests).
    pub fn active_index(&self) -> usize {
        self.lock().active_index
    }

    /// Snapshot of the rotation record.
    pub fn record(&self) -> RotationRecord {
        self.lock().clone()
    }

    /// Reserve the starting slot for one request.
    ///
    /// Applies the daily reset, returns the active index and advances it by
    /// one so a concurrent request starts on the next key.
    pub fn checkout(&self, today: NaiveDate) -> usize {
        let mut record = self.lock();
        if record.last_reset != Some(today) {
            log::debug!("rotation: new day {today}, resetting active index");
            record.active_index = 0;
            record.last_reset = Some(today);
        }
        let start = record.active_index;
        if !self.keys.is_empty() {
            record.active_index = (start + 1) % self.keys.len();
        }
        self.persist(&record);
        start
    }

    /// `index` succeeded: the next request starts on the key after it.
    pub fn record_success(&self, index: usize) {
        if self.keys.is_empty() {
            return;
        }
        let mut record = self.lock();
        record.active_index = (index + 1) % self.keys.len();
        self.persist(&record);
    }

    /// Every key failed: start over from the first key.
    pub fn record_exhausted(&self) {
        let mut record = self.lock();
        record.active_index = 0;
        self.persist(&record);
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    fn lock(&self) -> MutexGuard<'_, RotationRecord> {
        self.record.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Called with the lock held so file writes are serialized too.
    fn persist(&self, record: &RotationRecord) {
        let Some(path) = &self.path else {
            return;
        };
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                log::warn!("rotation: cannot create {}: {e}", parent.display());
                return;
            }
        }
        match serde_json::to_string_pretty(record) {
            Ok(data) => {
                if let Err(e) = std::fs::write(path, data) {
                    log::warn!("rotation: cannot save {}: {e}", path.display());
                }
            }
            Err(e) => log::warn!("rotation: cannot encode record: {e}"),
        }
    }
}

fn clean_keys(keys: Vec<String>) -> Vec<String> {
    keys.into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect()
}

fn read_record(path: &PathBuf) -> Option<RotationRecord> {
    let data = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&data) {
        Ok(record) => Some(record),
        Err(e) => {
            log::warn!("rotation: ignoring unreadable {}: {e}", path.display());
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    fn keys(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("sk-{i}")).collect()
    }

    #[test]
    fn blank_keys_are_dropped() {
        let pool = KeyPool::new(vec!["  ".into(), "sk-a".into(), "".into()]);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.key(0), Some("sk-a"));
    }

    #[test]
    fn successes_spread_across_keys() {
        let pool = KeyPool::new(keys(3));
        let mut used = Vec::new();
        for _ in 0..4 {
            let idx = pool.checkout(day(16));
            pool.record_success(idx);
            used.push(idx);
        }
        assert_eq!(used, vec![0, 1, 2, 0]);
    }

    #[test]
    fn success_on_later_key_moves_past_it() {
        let pool = KeyPool::new(keys(3));
        let start = pool.checkout(day(16));
        assert_eq!(start, 0);
        // key 0 failed, key 1 succeeded
        pool.record_success(1);
        assert_eq!(pool.active_index(), 2);
    }

    #[test]
    fn exhaustion_resets_to_first_key() {
        let pool = KeyPool::new(keys(3));
        pool.checkout(day(16));
        pool.record_success(1);
        pool.record_exhausted();
        assert_eq!(pool.active_index(), 0);
    }

    #[test]
    fn concurrent_checkouts_get_different_slots() {
        let pool = KeyPool::new(keys(3));
        let a = pool.checkout(day(16));
        let b = pool.checkout(day(16));
        assert_ne!(a, b);
    }

    #[test]
    fn new_day_resets_index() {
        let pool = KeyPool::new(keys(3));
        pool.checkout(day(16));
        pool.record_success(1);
        assert_eq!(pool.active_index(), 2);

        assert_eq!(pool.checkout(day(17)), 0);
        assert_eq!(pool.record().last_reset, Some(day(17)));
    }

    #[test]
    fn record_persists_between_pools() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("key-rotation.json");

        let pool = KeyPool::load(keys(3), path.clone());
        pool.checkout(day(16));
        pool.record_success(1);

        let reloaded = KeyPool::load(keys(3), path);
        assert_eq!(reloaded.active_index(), 2);
        assert_eq!(reloaded.record().last_reset, Some(day(16)));
        assert_eq!(reloaded.checkout(day(16)), 2);
    }

    #[test]
    fn changed_pool_size_resets_record() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("key-rotation.json");

        let pool = KeyPool::load(keys(3), path.clone());
        pool.checkout(day(16));
        pool.record_success(1);

        let smaller = KeyPool::load(keys(2), path);
        assert_eq!(smaller.active_index(), 0);
    }

    #[test]
    fn corrupt_record_starts_fresh() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("key-rotation.json");
        std::fs::write(&path, "not json").expect("write");

        let pool = KeyPool::load(keys(2), path);
        assert_eq!(pool.active_index(), 0);
    }

    #[test]
    fn empty_pool_is_harmless() {
        let pool = KeyPool::new(Vec::new());
        assert!(pool.is_empty());
        assert_eq!(pool.key(0), None);
        assert_eq!(pool.checkout(day(16)), 0);
        pool.record_success(0);
        pool.record_exhausted();
    }
}
