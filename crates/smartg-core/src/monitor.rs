//! Monitor: the state object plus the user-initiated transitions that persist.
//!
//! Each action validates, performs its storage round-trip, and only then applies
//! the matching [`MonitorState`] transition. A failure is reported once to the
//! caller and the action is abandoned; nothing is retried.

use log::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::MonitorConfig;
use crate::domain::{DeviceId, DeviceStatus, NewWorker, SensorReading, WorkerId};
use crate::random::{RandomSource, StdRandom};
use crate::state::{MonitorState, TickReport, WorkerSample};
use crate::store::{RecordStore, StoreError};
use crate::validation::{normalize_device_id, validate_new_worker, validate_reading, ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("device {0} is already registered")]
    DuplicateDevice(DeviceId),
    #[error("unknown worker {0}")]
    UnknownWorker(WorkerId),
    #[error("unknown device {0}")]
    UnknownDevice(DeviceId),
    #[error("worker {0} is already paired")]
    AlreadyPaired(WorkerId),
    #[error("worker {0} is not paired")]
    NotPaired(WorkerId),
    #[error("device {device} is {status}")]
    DeviceUnavailable { device: DeviceId, status: DeviceStatus },
    #[error("device {device} is in use by worker {worker}")]
    DeviceInUse { device: DeviceId, worker: WorkerId },
    #[error("storage: {0}")]
    Store(#[from] StoreError),
    /// Registration succeeded but pairing did not. `orphaned` is set when the
    /// compensating delete failed too and the device row was left behind.
    #[error("pairing device {device} failed (orphaned: {orphaned}): {source}")]
    Pairing {
        device: DeviceId,
        source: StoreError,
        orphaned: bool,
    },
}

pub struct Monitor<S: RecordStore> {
    cfg: MonitorConfig,
    store: S,
    state: MonitorState,
    rng: Box<dyn RandomSource>,
    clock: Box<dyn Clock>,
    simulation_enabled: bool,
}

impl<S: RecordStore> Monitor<S> {
    pub fn new(cfg: MonitorConfig, store: S) -> Self {
        Self::with_sources(cfg, store, Box::new(StdRandom::from_entropy()), Box::new(SystemClock))
    }

    pub fn with_sources(
        cfg: MonitorConfig,
        store: S,
        rng: Box<dyn RandomSource>,
        clock: Box<dyn Clock>,
    ) -> Self {
        let state = MonitorState::from_config(&cfg);
        let simulation_enabled = cfg.sampling.simulation_enabled;
        Self { cfg, store, state, rng, clock, simulation_enabled }
    }

    pub fn state(&self) -> &MonitorState {
        &self.state
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.cfg
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Give the store back, dropping the in-memory state.
    pub fn into_store(self) -> S {
        self.store
    }

    pub fn simulation_enabled(&self) -> bool {
        self.simulation_enabled
    }

    pub fn set_simulation_enabled(&mut self, enabled: bool) {
        if self.simulation_enabled != enabled {
            info!("simulation {}", if enabled { "enabled" } else { "disabled" });
        }
        self.simulation_enabled = enabled;
    }

    /// Ticks run only while simulation is on and at least one worker exists.
    pub fn should_sample(&self) -> bool {
        self.simulation_enabled && self.state.has_workers()
    }

    /// Replace the in-memory state with the store's records. Every worker starts
    /// at Safe with a zeroed reading; logs start empty.
    pub fn load(&mut self) -> Result<(), MonitorError> {
        let workers = self.store.fetch_workers()?;
        let devices = self.store.fetch_devices()?;
        let mut state = MonitorState::from_config(&self.cfg);
        for d in devices {
            state.insert_device(d);
        }
        for w in workers {
            state.insert_worker(w);
        }
        info!(
            "loaded {} workers and {} devices",
            state.workers().len(),
            state.devices().len()
        );
        self.state = state;
        Ok(())
    }

    pub fn add_worker(&mut self, new: NewWorker) -> Result<WorkerId, MonitorError> {
        let new = validate_new_worker(&new)?;
        let record = self.store.add_worker(&new).map_err(|e| {
            warn!("add worker {:?} failed: {e}", new.name);
            e
        })?;
        let id = record.id.clone();
        info!("worker {id} ({}) added", record.name);
        self.state.insert_worker(record);
        Ok(id)
    }

    /// Delete a worker, unpairing its device first. If the unpair fails the
    /// delete is abandoned.
    pub fn delete_worker(&mut self, id: &WorkerId) -> Result<(), MonitorError> {
        let worker = self
            .state
            .worker(id)
            .ok_or_else(|| MonitorError::UnknownWorker(id.clone()))?;
        if worker.paired && worker.device_id.is_some() {
            self.unpair(id)?;
        }
        self.store.delete_worker(id).map_err(|e| {
            warn!("delete worker {id} failed: {e}");
            e
        })?;
        self.state.remove_worker(id);
        info!("worker {id} deleted");
        Ok(())
    }

    /// Register a new wristband and pair it with `worker` in one action.
    ///
    /// Duplicate ids are rejected before any storage call. If pairing fails
    /// after the device row was created, the row is deleted again.
    pub fn register_device(&mut self, raw_id: &str, worker: &WorkerId) -> Result<DeviceId, MonitorError> {
        let device = normalize_device_id(raw_id)?;
        if self.state.device(&device).is_some() {
            return Err(MonitorError::DuplicateDevice(device));
        }
        let target = self
            .state
            .worker(worker)
            .ok_or_else(|| MonitorError::UnknownWorker(worker.clone()))?;
        if target.paired {
            return Err(MonitorError::AlreadyPaired(worker.clone()));
        }

        let record = self.store.register_device(&device).map_err(|e| match e {
            StoreError::Conflict(_) => MonitorError::DuplicateDevice(device.clone()),
            other => {
                warn!("register device {device} failed: {other}");
                MonitorError::Store(other)
            }
        })?;

        if let Err(source) = self.store.pair_device(worker, &device) {
            let orphaned = match self.store.delete_device(&device) {
                Ok(()) => false,
                Err(e) => {
                    warn!("device {device} left orphaned, compensation failed: {e}");
                    true
                }
            };
            warn!("pairing {device} with {worker} failed: {source}");
            return Err(MonitorError::Pairing { device, source, orphaned });
        }

        let now = self.clock.now();
        self.state.insert_device(record);
        self.state.bind_device(worker, &device, self.rng.as_mut(), now);
        info!("device {device} registered and paired with {worker}");
        Ok(device)
    }

    /// Pair an already registered device that nobody holds.
    pub fn pair(&mut self, worker: &WorkerId, raw_device: &str) -> Result<(), MonitorError> {
        let device = normalize_device_id(raw_device)?;
        let record = self
            .state
            .device(&device)
            .ok_or_else(|| MonitorError::UnknownDevice(device.clone()))?;
        if record.status == DeviceStatus::Maintenance {
            return Err(MonitorError::DeviceUnavailable { device, status: record.status });
        }
        if let Some(holder) = self.state.holder_of(&device) {
            return Err(MonitorError::DeviceInUse { device, worker: holder.id.clone() });
        }
        let target = self
            .state
            .worker(worker)
            .ok_or_else(|| MonitorError::UnknownWorker(worker.clone()))?;
        if target.paired {
            return Err(MonitorError::AlreadyPaired(worker.clone()));
        }

        self.store.pair_device(worker, &device).map_err(|e| {
            warn!("pairing {device} with {worker} failed: {e}");
            e
        })?;
        let now = self.clock.now();
        self.state.bind_device(worker, &device, self.rng.as_mut(), now);
        info!("device {device} paired with {worker}");
        Ok(())
    }

    /// Returns the device that was released.
    pub fn unpair(&mut self, worker: &WorkerId) -> Result<DeviceId, MonitorError> {
        let target = self
            .state
            .worker(worker)
            .ok_or_else(|| MonitorError::UnknownWorker(worker.clone()))?;
        let device = match (&target.device_id, target.paired) {
            (Some(d), true) => d.clone(),
            _ => return Err(MonitorError::NotPaired(worker.clone())),
        };

        self.store.unpair_device(worker, &device).map_err(|e| {
            warn!("unpairing {device} from {worker} failed: {e}");
            e
        })?;
        self.state.release_device(worker);
        info!("device {device} unpaired from {worker}");
        Ok(device)
    }

    /// Feed a reading from a real wristband through the same path as a tick sample.
    pub fn ingest_reading(&mut self, worker: &WorkerId, reading: SensorReading) -> Result<WorkerSample, MonitorError> {
        validate_reading(&reading)?;
        match self.state.ingest(worker, reading, &self.cfg) {
            Some((sample, _alert)) => Ok(sample),
            None if self.state.worker(worker).is_some() => Err(MonitorError::NotPaired(worker.clone())),
            None => Err(MonitorError::UnknownWorker(worker.clone())),
        }
    }

    /// Run one sampling pass unconditionally.
    pub fn tick(&mut self) -> TickReport {
        let now = self.clock.now();
        let report = self.state.tick(&self.cfg, self.rng.as_mut(), now);
        debug!(
            "tick at {}: {} samples, {} escalations",
            now.format("%H.%M.%S"),
            report.samples.len(),
            report.escalations()
        );
        report
    }

    /// Run a sampling pass if [`Self::should_sample`] allows it.
    pub fn tick_if_enabled(&mut self) -> Option<TickReport> {
        if self.should_sample() {
            Some(self.tick())
        } else {
            None
        }
    }
}
