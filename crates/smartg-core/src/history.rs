//! Raw reading history, shared by all workers, for charting.

use std::collections::VecDeque;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::domain::{SensorReading, WorkerId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub worker_id: WorkerId,
    pub taken_at: DateTime<Local>,
    pub gsr: f64,
    pub imu: f64,
    pub spo2: f64,
}

impl HistoryEntry {
    pub fn from_reading(worker_id: WorkerId, reading: &SensorReading, taken_at: DateTime<Local>) -> Self {
        Self {
            worker_id,
            taken_at,
            gsr: reading.gsr,
            imu: reading.imu,
            spo2: reading.spo2,
        }
    }
}

/// Appends at the tail; drops the globally oldest entry once full,
/// whichever worker produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryBuffer {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl HistoryBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push_back(entry);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn for_worker<'a>(&'a self, worker_id: &'a WorkerId) -> impl Iterator<Item = &'a HistoryEntry> + 'a {
        self.entries.iter().filter(move |e| &e.worker_id == worker_id)
    }

    /// Last `n` entries for one worker, oldest first.
    pub fn recent_for_worker(&self, worker_id: &WorkerId, n: usize) -> Vec<&HistoryEntry> {
        let mut recent: Vec<_> = self.entries.iter().rev().filter(|e| &e.worker_id == worker_id).take(n).collect();
        recent.reverse();
        recent
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(200)
    }
}
