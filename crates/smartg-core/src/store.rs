//! Record-access seam to the storage backend.

use crate::domain::{DeviceId, DeviceRecord, DeviceStatus, NewWorker, WorkerId, WorkerRecord};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0} already exists")]
    Conflict(String),
    #[error("storage backend: {0}")]
    Backend(String),
}

/// Persistence for worker and device records.
///
/// `pair_device` and `unpair_device` touch both the worker and the device row
/// and must apply both or neither.
pub trait RecordStore: Send {
    fn fetch_workers(&mut self) -> Result<Vec<WorkerRecord>, StoreError>;
    fn fetch_devices(&mut self) -> Result<Vec<DeviceRecord>, StoreError>;
    /// The store assigns the id; new workers start unpaired.
    fn add_worker(&mut self, new: &NewWorker) -> Result<WorkerRecord, StoreError>;
    fn delete_worker(&mut self, id: &WorkerId) -> Result<(), StoreError>;
    /// New devices start `Active` at 100% battery.
    fn register_device(&mut self, id: &DeviceId) -> Result<DeviceRecord, StoreError>;
    /// Compensation for a registration whose pairing failed.
    fn delete_device(&mut self, id: &DeviceId) -> Result<(), StoreError>;
    fn pair_device(&mut self, worker: &WorkerId, device: &DeviceId) -> Result<(), StoreError>;
    fn unpair_device(&mut self, worker: &WorkerId, device: &DeviceId) -> Result<(), StoreError>;
}

/// Volatile store for simulations and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    workers: Vec<WorkerRecord>,
    devices: Vec<DeviceRecord>,
    next_id: u32,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(workers: Vec<WorkerRecord>, devices: Vec<DeviceRecord>) -> Self {
        Self { workers, devices, next_id: 0 }
    }

    fn worker_mut(&mut self, id: &WorkerId) -> Result<&mut WorkerRecord, StoreError> {
        self.workers
            .iter_mut()
            .find(|w| &w.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("worker {id}")))
    }

    fn device_index(&self, id: &DeviceId) -> Result<usize, StoreError> {
        self.devices
            .iter()
            .position(|d| &d.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("device {id}")))
    }

    fn issue_id(&mut self) -> WorkerId {
        loop {
            self.next_id += 1;
            let id = WorkerId(format!("W{:04}", self.next_id));
            if !self.workers.iter().any(|w| w.id == id) {
                return id;
            }
        }
    }
}

impl RecordStore for InMemoryStore {
    fn fetch_workers(&mut self) -> Result<Vec<WorkerRecord>, StoreError> {
        Ok(self.workers.clone())
    }

    fn fetch_devices(&mut self) -> Result<Vec<DeviceRecord>, StoreError> {
        Ok(self.devices.clone())
    }

    fn add_worker(&mut self, new: &NewWorker) -> Result<WorkerRecord, StoreError> {
        let record = WorkerRecord {
            id: self.issue_id(),
            name: new.name.clone(),
            age: new.age,
            occupation: new.occupation.clone(),
            device_id: None,
            paired: false,
        };
        self.workers.push(record.clone());
        Ok(record)
    }

    fn delete_worker(&mut self, id: &WorkerId) -> Result<(), StoreError> {
        let before = self.workers.len();
        self.workers.retain(|w| &w.id != id);
        if self.workers.len() == before {
            return Err(StoreError::NotFound(format!("worker {id}")));
        }
        Ok(())
    }

    fn register_device(&mut self, id: &DeviceId) -> Result<DeviceRecord, StoreError> {
        if self.devices.iter().any(|d| &d.id == id) {
            return Err(StoreError::Conflict(format!("device {id}")));
        }
        let record = DeviceRecord::registered(id.clone());
        self.devices.push(record.clone());
        Ok(record)
    }

    fn delete_device(&mut self, id: &DeviceId) -> Result<(), StoreError> {
        let idx = self.device_index(id)?;
        self.devices.remove(idx);
        Ok(())
    }

    fn pair_device(&mut self, worker: &WorkerId, device: &DeviceId) -> Result<(), StoreError> {
        let idx = self.device_index(device)?;
        let w = self.worker_mut(worker)?;
        w.device_id = Some(device.clone());
        w.paired = true;
        self.devices[idx].status = DeviceStatus::Active;
        Ok(())
    }

    fn unpair_device(&mut self, worker: &WorkerId, device: &DeviceId) -> Result<(), StoreError> {
        let idx = self.device_index(device)?;
        let w = self.worker_mut(worker)?;
        w.device_id = None;
        w.paired = false;
        self.devices[idx].status = DeviceStatus::Inactive;
        Ok(())
    }
}
