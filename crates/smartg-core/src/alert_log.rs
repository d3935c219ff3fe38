//! Bounded newest-first log of risk escalations.

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::classifier::Trigger;
use crate::domain::{DeviceId, RiskLevel, WorkerId};

/// Response issued for an escalation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertAction {
    /// Haptic buzz on the worker's wristband.
    DeviceVibration,
    SupervisorNotification,
}

impl AlertAction {
    /// Warning escalations buzz the wristband; anything worse pages a supervisor.
    pub fn for_level(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Warning => AlertAction::DeviceVibration,
            _ => AlertAction::SupervisorNotification,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AlertAction::DeviceVibration => "Device vibration",
            AlertAction::SupervisorNotification => "Supervisor notification",
        }
    }
}

impl fmt::Display for AlertAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertLogEntry {
    pub id: Uuid,
    pub worker_id: WorkerId,
    pub device_id: Option<DeviceId>,
    pub occurred_at: DateTime<Local>,
    pub trigger: Trigger,
    /// Never `Safe`.
    pub risk_level: RiskLevel,
    pub action: AlertAction,
}

impl AlertLogEntry {
    pub fn new(
        worker_id: WorkerId,
        device_id: Option<DeviceId>,
        occurred_at: DateTime<Local>,
        trigger: Trigger,
        risk_level: RiskLevel,
    ) -> Self {
        debug_assert!(risk_level.is_elevated());
        Self {
            id: Uuid::new_v4(),
            worker_id,
            device_id,
            occurred_at,
            trigger,
            risk_level,
            action: AlertAction::for_level(risk_level),
        }
    }
}

/// Inserts at the head and drops from the tail once `capacity` is reached.
/// Repeated escalations from one worker are all kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertLog {
    entries: VecDeque<AlertLogEntry>,
    capacity: usize,
}

impl AlertLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Returns the entry evicted to make room, if any.
    pub fn push_front(&mut self, entry: AlertLogEntry) -> Option<AlertLogEntry> {
        self.entries.push_front(entry);
        if self.entries.len() > self.capacity {
            self.entries.pop_back()
        } else {
            None
        }
    }

    /// Newest first.
    pub fn entries(&self) -> impl Iterator<Item = &AlertLogEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&AlertLogEntry> {
        self.entries.front()
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

impl Default for AlertLog {
    fn default() -> Self {
        Self::new(20)
    }
}
