//! Bounded per-instrument price history and trend queries

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::types::{Sample, Trend};

/// Subset of a sample retained for trend analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub value: f64,
    pub change_24h: Option<f64>,
    pub volume: Option<f64>,
    pub time: DateTime<Utc>,
}

impl From<&Sample> for HistoryEntry {
    fn from(sample: &Sample) -> Self {
        Self {
            value: sample.value,
            change_24h: sample.change_24h,
            volume: sample.volume,
            time: sample.time,
        }
    }
}

/// Per-instrument rolling history, oldest entry first.
///
/// Each sequence is bounded by `cap`; appending past the cap evicts the
/// oldest entry (ring-buffer semantics).
#[derive(Debug, Clone)]
pub struct HistoryBook {
    entries: HashMap<String, VecDeque<HistoryEntry>>,
    cap: usize,
}

impl HistoryBook {
    pub fn new(cap: usize) -> Self {
        Self {
            entries: HashMap::new(),
            cap,
        }
    }

    /// Rebuild from a persisted map, re-applying the cap in case the
    /// deployment lowered it since the state was written.
    pub fn from_persisted(map: HashMap<String, Vec<HistoryEntry>>, cap: usize) -> Self {
        let mut book = Self::new(cap);
        for (instrument, entries) in map {
            let mut deque: VecDeque<HistoryEntry> = entries.into();
            while deque.len() > cap {
                deque.pop_front();
            }
            book.entries.insert(instrument, deque);
        }
        book
    }

    pub fn append(&mut self, instrument: &str, entry: HistoryEntry) {
        let series = self
            .entries
            .entry(instrument.to_string())
            .or_insert_with(VecDeque::new);
        series.push_back(entry);
        while series.len() > self.cap {
            series.pop_front();
        }
    }

    /// Retained entries for an instrument, oldest first
    pub fn history(&self, instrument: &str) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.get(instrument).into_iter().flatten()
    }

    pub fn len(&self, instrument: &str) -> usize {
        self.entries.get(instrument).map_or(0, |series| series.len())
    }

    /// Latest entry for an instrument, if any
    pub fn latest(&self, instrument: &str) -> Option<&HistoryEntry> {
        self.entries.get(instrument).and_then(|series| series.back())
    }

    /// Two-step monotonicity check over the last three values.
    ///
    /// Any zero delta or sign change counts as Flat; callers rely on
    /// this coarse two-step rule, it is not a regression fit.
    pub fn trend(&self, instrument: &str) -> Trend {
        let series = match self.entries.get(instrument) {
            Some(series) if series.len() >= 3 => series,
            _ => return Trend::InsufficientData,
        };

        let n = series.len();
        let a = series[n - 3].value;
        let b = series[n - 2].value;
        let c = series[n - 1].value;

        let d1 = b - a;
        let d2 = c - b;

        if d1 > 0.0 && d2 > 0.0 {
            Trend::Rising
        } else if d1 < 0.0 && d2 < 0.0 {
            Trend::Falling
        } else {
            Trend::Flat
        }
    }

    /// Drop an instrument's history, keeping the history map in sync
    /// with the tracked set.
    pub fn remove(&mut self, instrument: &str) {
        self.entries.remove(instrument);
    }

    /// Snapshot for persistence (full-state overwrite)
    pub fn to_persisted(&self) -> HashMap<String, Vec<HistoryEntry>> {
        self.entries
            .iter()
            .map(|(instrument, series)| {
                (instrument.clone(), series.iter().cloned().collect())
            })
            .collect()
    }
}
