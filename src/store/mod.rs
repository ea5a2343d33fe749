//! Keyed `(timestamp, value)` store plus the rate and average primitives
//! the trend computations are built on.
//!
//! The store is always passed in explicitly. Callers guarantee at most one
//! concurrent check per key, so nothing here locks.

pub mod file;

use crate::error::{CheckError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use file::FileStore;

pub trait ValueStore {
    fn get(&self, key: &str) -> Option<(f64, f64)>;
    fn set(&mut self, key: &str, timestamp: f64, value: f64);
}

/// In-memory store. Also the serialized form of [`FileStore`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryStore {
    entries: BTreeMap<String, (f64, f64)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

impl ValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<(f64, f64)> {
        self.entries.get(key).copied()
    }

    fn set(&mut self, key: &str, timestamp: f64, value: f64) {
        self.entries.insert(key.to_string(), (timestamp, value));
    }
}

/// Per-second rate of change of `value` since the last call for `key`.
///
/// The first sample for a key only initialises the counter and yields
/// `InsufficientData`. A repeated call with the same timestamp keeps the
/// stored sample untouched and also yields `InsufficientData`.
pub fn get_rate(store: &mut dyn ValueStore, key: &str, now: f64, value: f64) -> Result<f64> {
    let Some((last_time, last_value)) = store.get(key) else {
        store.set(key, now, value);
        return Err(CheckError::InsufficientData(format!("counter {:?} initialised", key)));
    };

    if now == last_time {
        return Err(CheckError::InsufficientData(format!("no time elapsed for {:?}", key)));
    }
    store.set(key, now, value);
    if now < last_time {
        return Err(CheckError::InsufficientData(format!("time went backwards for {:?}", key)));
    }
    Ok((value - last_value) / (now - last_time))
}

/// Exponentially weighted moving average of `value` over `backlog_minutes`.
///
/// Samples older than the backlog carry half the weight. Until a full backlog
/// has been observed the average is the time-weighted mean of what has been
/// seen so far. The first call returns `value` itself.
///
/// Uses `key` for `(last_time, average)` and `key.since` for the start time.
pub fn get_average(store: &mut dyn ValueStore, key: &str, now: f64, value: f64, backlog_minutes: f64) -> f64 {
    let since_key = format!("{}.since", key);
    let Some((last_time, last_average)) = store.get(key) else {
        store.set(key, now, value);
        store.set(&since_key, now, 1.0);
        return value;
    };
    if now <= last_time {
        return last_average;
    }

    let (start_time, samples) = store.get(&since_key).unwrap_or((last_time, 1.0));
    let backlog_secs = (backlog_minutes * 60.0).max(1.0);
    let weight = if last_time - start_time < backlog_secs {
        (last_time - start_time) / (now - start_time)
    } else {
        0.5_f64.powf((now - last_time) / backlog_secs)
    };

    let average = last_average * weight + value * (1.0 - weight);
    store.set(key, now, average);
    store.set(&since_key, start_time, samples + 1.0);
    average
}
