//! Domain types: risk levels, readings, worker and device records.

use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Risk band, ordered `Safe < Warning < Danger`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Safe,
    Warning,
    Danger,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 3] = [RiskLevel::Safe, RiskLevel::Warning, RiskLevel::Danger];

    pub fn is_elevated(self) -> bool {
        self != RiskLevel::Safe
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::Safe => "Safe",
            RiskLevel::Warning => "Warning",
            RiskLevel::Danger => "Danger",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkerId(pub String);

impl WorkerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WorkerId {
    fn from(s: &str) -> Self {
        WorkerId(s.to_string())
    }
}

/// Wristband identifier, stored upper-case (e.g. `SGT-001A`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(pub String);

impl DeviceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(s: &str) -> Self {
        DeviceId(s.to_string())
    }
}

/// One biometric sample. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Galvanic skin response (dehydration / stress).
    pub gsr: f64,
    /// Inertial measurement magnitude (tremor / stability).
    pub imu: f64,
    /// Blood oxygen saturation, percent.
    pub spo2: f64,
    /// `None` only for the zeroed reading held by unpaired workers.
    pub taken_at: Option<DateTime<Local>>,
}

impl SensorReading {
    pub fn new(gsr: f64, imu: f64, spo2: f64, taken_at: DateTime<Local>) -> Self {
        Self { gsr, imu, spo2, taken_at: Some(taken_at) }
    }

    pub fn zeroed() -> Self {
        Self { gsr: 0.0, imu: 0.0, spo2: 0.0, taken_at: None }
    }

    pub fn is_zeroed(&self) -> bool {
        self.taken_at.is_none() && self.gsr == 0.0 && self.imu == 0.0 && self.spo2 == 0.0
    }

    /// Wall-clock time as shown on the dashboard (`HH.MM.SS`), `-` when zeroed.
    pub fn display_time(&self) -> String {
        match self.taken_at {
            Some(ts) => ts.format("%H.%M.%S").to_string(),
            None => "-".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceStatus {
    Active,
    Inactive,
    Maintenance,
}

impl DeviceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceStatus::Active => "active",
            DeviceStatus::Inactive => "inactive",
            DeviceStatus::Maintenance => "maintenance",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Some(DeviceStatus::Active),
            "inactive" => Some(DeviceStatus::Inactive),
            "maintenance" => Some(DeviceStatus::Maintenance),
            _ => None,
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub id: DeviceId,
    pub status: DeviceStatus,
    /// Percent.
    pub battery: f64,
}

impl DeviceRecord {
    pub fn registered(id: DeviceId) -> Self {
        Self { id, status: DeviceStatus::Active, battery: 100.0 }
    }
}

/// Worker row as persisted by the record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerRecord {
    pub id: WorkerId,
    pub name: String,
    pub age: u32,
    pub occupation: String,
    pub device_id: Option<DeviceId>,
    pub paired: bool,
}

/// Input for creating a worker; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWorker {
    pub name: String,
    pub occupation: String,
    pub age: u32,
}
