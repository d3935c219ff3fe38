//! Per-worker risk state machine.
//!
//! Unpaired workers are frozen at `Safe` with a zeroed reading. Pairing seeds a
//! fresh Safe-band reading; from then on the level only changes on a sampling
//! tick, and always equals the classification of `last_reading`.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::classifier::classify;
use crate::domain::{DeviceId, RiskLevel, SensorReading, WorkerId, WorkerRecord};
use crate::generator::generate;
use crate::random::RandomSource;
use crate::thresholds::Thresholds;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerState {
    pub id: WorkerId,
    pub name: String,
    pub age: u32,
    pub occupation: String,
    pub device_id: Option<DeviceId>,
    pub paired: bool,
    pub risk_level: RiskLevel,
    pub last_reading: SensorReading,
}

impl WorkerState {
    /// State for a freshly loaded or created record. Sampling starts at the next tick.
    pub fn from_record(record: WorkerRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            age: record.age,
            occupation: record.occupation,
            device_id: record.device_id,
            paired: record.paired,
            risk_level: RiskLevel::Safe,
            last_reading: SensorReading::zeroed(),
        }
    }

    pub fn pair(&mut self, device_id: DeviceId, rng: &mut dyn RandomSource, now: DateTime<Local>) {
        self.device_id = Some(device_id);
        self.paired = true;
        self.last_reading = generate(RiskLevel::Safe, rng, now);
        self.risk_level = RiskLevel::Safe;
    }

    pub fn unpair(&mut self) {
        self.device_id = None;
        self.paired = false;
        self.risk_level = RiskLevel::Safe;
        self.last_reading = SensorReading::zeroed();
    }

    /// Commit a sampled reading; returns the previous level.
    pub fn observe(&mut self, thresholds: &Thresholds, reading: SensorReading) -> RiskLevel {
        let previous = self.risk_level;
        self.risk_level = classify(thresholds, &reading);
        self.last_reading = reading;
        previous
    }
}
