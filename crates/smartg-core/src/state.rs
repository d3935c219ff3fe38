//! Application state and its transitions.
//!
//! Every transition here is infallible. Callers that persist changes
//! ([`crate::monitor::Monitor`]) apply a transition only after the storage
//! round-trip has succeeded, so a failed call never leaves partial state behind.

use chrono::{DateTime, Local};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::alert_log::{AlertLog, AlertLogEntry};
use crate::classifier::{classify, primary_trigger};
use crate::config::MonitorConfig;
use crate::domain::{DeviceId, DeviceRecord, DeviceStatus, RiskLevel, SensorReading, WorkerId, WorkerRecord};
use crate::generator::{generate, pick_target_band};
use crate::history::{HistoryBuffer, HistoryEntry};
use crate::random::RandomSource;
use crate::worker::WorkerState;

/// One worker's outcome within a tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkerSample {
    pub worker_id: WorkerId,
    /// Band the sample was generated for; may disagree with `level`.
    pub target_band: RiskLevel,
    pub previous: RiskLevel,
    pub level: RiskLevel,
    pub reading: SensorReading,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickReport {
    pub ticked_at: DateTime<Local>,
    pub samples: Vec<WorkerSample>,
    /// Escalations appended during this tick, in worker order.
    pub alerts: Vec<AlertLogEntry>,
}

impl TickReport {
    pub fn escalations(&self) -> usize {
        self.alerts.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorState {
    workers: Vec<WorkerState>,
    devices: Vec<DeviceRecord>,
    alerts: AlertLog,
    history: HistoryBuffer,
}

impl Default for MonitorState {
    fn default() -> Self {
        Self::with_capacity(20, 200)
    }
}

impl MonitorState {
    pub fn with_capacity(alerts: usize, history: usize) -> Self {
        Self {
            workers: Vec::new(),
            devices: Vec::new(),
            alerts: AlertLog::new(alerts),
            history: HistoryBuffer::new(history),
        }
    }

    pub fn from_config(cfg: &MonitorConfig) -> Self {
        Self::with_capacity(cfg.logs.alerts, cfg.logs.history)
    }

    pub fn workers(&self) -> &[WorkerState] {
        &self.workers
    }

    pub fn devices(&self) -> &[DeviceRecord] {
        &self.devices
    }

    pub fn alerts(&self) -> &AlertLog {
        &self.alerts
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn worker(&self, id: &WorkerId) -> Option<&WorkerState> {
        self.workers.iter().find(|w| &w.id == id)
    }

    pub fn device(&self, id: &DeviceId) -> Option<&DeviceRecord> {
        self.devices.iter().find(|d| &d.id == id)
    }

    /// Worker currently paired with `device`, if any.
    pub fn holder_of(&self, device: &DeviceId) -> Option<&WorkerState> {
        self.workers
            .iter()
            .find(|w| w.paired && w.device_id.as_ref() == Some(device))
    }

    pub fn has_workers(&self) -> bool {
        !self.workers.is_empty()
    }

    pub fn insert_worker(&mut self, record: WorkerRecord) {
        self.workers.push(WorkerState::from_record(record));
    }

    pub fn remove_worker(&mut self, id: &WorkerId) -> Option<WorkerState> {
        let idx = self.workers.iter().position(|w| &w.id == id)?;
        Some(self.workers.remove(idx))
    }

    pub fn insert_device(&mut self, record: DeviceRecord) {
        self.devices.push(record);
    }

    pub fn remove_device(&mut self, id: &DeviceId) -> Option<DeviceRecord> {
        let idx = self.devices.iter().position(|d| &d.id == id)?;
        Some(self.devices.remove(idx))
    }

    /// Pair `worker` with `device`: the device goes active and the worker is
    /// reseeded with a Safe-band reading.
    pub fn bind_device(
        &mut self,
        worker: &WorkerId,
        device: &DeviceId,
        rng: &mut dyn RandomSource,
        now: DateTime<Local>,
    ) {
        if let Some(d) = self.devices.iter_mut().find(|d| &d.id == device) {
            d.status = DeviceStatus::Active;
        }
        if let Some(w) = self.workers.iter_mut().find(|w| &w.id == worker) {
            w.pair(device.clone(), rng, now);
        }
    }

    /// Unpair `worker`; its former device goes inactive. Returns that device.
    pub fn release_device(&mut self, worker: &WorkerId) -> Option<DeviceId> {
        let w = self.workers.iter_mut().find(|w| &w.id == worker)?;
        let device = w.device_id.clone();
        w.unpair();
        if let Some(id) = &device {
            if let Some(d) = self.devices.iter_mut().find(|d| &d.id == id) {
                d.status = DeviceStatus::Inactive;
            }
        }
        device
    }

    /// One sampling pass over every paired worker, in collection order.
    ///
    /// Per worker: pick the target band (usually the current level), generate a
    /// reading, classify it, log an alert when the level changed to a non-Safe
    /// one, append to history, commit. Battery drain runs after all workers.
    pub fn tick(&mut self, cfg: &MonitorConfig, rng: &mut dyn RandomSource, now: DateTime<Local>) -> TickReport {
        let mut samples = Vec::new();
        let mut alerts = Vec::new();

        for worker in self.workers.iter_mut().filter(|w| w.paired) {
            let target_band = pick_target_band(worker.risk_level, cfg.sampling.band_jump_probability, rng);
            let reading = generate(target_band, rng, now);
            let (sample, alert) = commit_sample(worker, &mut self.history, cfg, target_band, reading, now);
            alerts.extend(alert);
            samples.push(sample);
        }

        for entry in &alerts {
            self.alerts.push_front(entry.clone());
        }

        self.drain_batteries(cfg, rng);

        TickReport { ticked_at: now, samples, alerts }
    }

    /// Commit a reading reported by a real device for a paired worker.
    /// Returns `None` when the worker is unknown or unpaired.
    pub fn ingest(
        &mut self,
        worker: &WorkerId,
        reading: SensorReading,
        cfg: &MonitorConfig,
    ) -> Option<(WorkerSample, Option<AlertLogEntry>)> {
        let w = self.workers.iter_mut().find(|w| &w.id == worker && w.paired)?;
        let now = reading.taken_at.unwrap_or_else(Local::now);
        let target_band = w.risk_level;
        let (sample, alert) = commit_sample(w, &mut self.history, cfg, target_band, reading, now);
        if let Some(entry) = &alert {
            self.alerts.push_front(entry.clone());
        }
        Some((sample, alert))
    }

    fn drain_batteries(&mut self, cfg: &MonitorConfig, rng: &mut dyn RandomSource) {
        for device in self
            .devices
            .iter_mut()
            .filter(|d| d.status == DeviceStatus::Active && d.battery > cfg.battery.floor)
        {
            device.battery -= rng.next_unit() * cfg.battery.max_drain_per_tick;
        }
    }

    /// Content hash of the whole state, for cheap change detection.
    pub fn digest(&self) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        if let Err(e) = serde_json::to_writer(&mut hasher, self) {
            warn!("state digest incomplete: {e}");
        }
        *hasher.finalize().as_bytes()
    }
}

/// Classify `reading`, log an escalation if the level changed to a non-Safe
/// one, append it to history and commit it to the worker.
fn commit_sample(
    worker: &mut WorkerState,
    history: &mut HistoryBuffer,
    cfg: &MonitorConfig,
    target_band: RiskLevel,
    reading: SensorReading,
    now: DateTime<Local>,
) -> (WorkerSample, Option<AlertLogEntry>) {
    let thresholds = &cfg.thresholds;
    let level = classify(thresholds, &reading);

    let alert = if level != worker.risk_level && level.is_elevated() {
        let entry = AlertLogEntry::new(
            worker.id.clone(),
            worker.device_id.clone(),
            now,
            primary_trigger(thresholds, &reading),
            level,
        );
        warn!(
            "worker {} escalated {} -> {}: {} ({})",
            worker.id, worker.risk_level, level, entry.trigger, entry.action
        );
        Some(entry)
    } else {
        None
    };

    history.push(HistoryEntry::from_reading(worker.id.clone(), &reading, now));
    let previous = worker.observe(thresholds, reading.clone());
    debug!(
        "worker {} sampled gsr={} imu={} spo2={} target={} level={}",
        worker.id, reading.gsr, reading.imu, reading.spo2, target_band, level
    );

    let sample = WorkerSample {
        worker_id: worker.id.clone(),
        target_band,
        previous,
        level,
        reading,
    };
    (sample, alert)
}
