//! Flat, serializable view of the whole monitor for one refresh.

use chrono::{DateTime, Local};
use serde::Serialize;
use smartg_core::{DeviceRecord, DeviceStatus, MonitorState, RiskLevel, WorkerState};

use crate::population::{critical_workers, population_metrics, PopulationMetric, PopulationMetrics};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkerRow {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub occupation: String,
    pub device_id: Option<String>,
    pub paired: bool,
    pub risk_level: RiskLevel,
    pub gsr: f64,
    pub imu: f64,
    pub spo2: f64,
    pub last_update: String,
}

impl From<&WorkerState> for WorkerRow {
    fn from(w: &WorkerState) -> Self {
        Self {
            id: w.id.to_string(),
            name: w.name.clone(),
            age: w.age,
            occupation: w.occupation.clone(),
            device_id: w.device_id.as_ref().map(|d| d.to_string()),
            paired: w.paired,
            risk_level: w.risk_level,
            gsr: w.last_reading.gsr,
            imu: w.last_reading.imu,
            spo2: w.last_reading.spo2,
            last_update: w.last_reading.display_time(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceRow {
    pub id: String,
    pub status: DeviceStatus,
    pub battery: f64,
    pub holder: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertRow {
    pub time: String,
    pub worker_id: String,
    pub worker_name: Option<String>,
    pub device_id: Option<String>,
    pub trigger: &'static str,
    pub risk_level: RiskLevel,
    pub action: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub metrics: PopulationMetrics,
    pub metric_list: Vec<PopulationMetric>,
    pub critical: Vec<WorkerRow>,
    pub workers: Vec<WorkerRow>,
    pub devices: Vec<DeviceRow>,
    /// Newest first.
    pub alerts: Vec<AlertRow>,
    pub latest_sample_at: Option<DateTime<Local>>,
}

impl DashboardSnapshot {
    pub fn project(state: &MonitorState) -> Self {
        let workers = state.workers();
        let metrics = population_metrics(workers);

        let devices = state.devices().iter().map(|d| device_row(state, d)).collect();

        let alerts = state
            .alerts()
            .entries()
            .map(|a| AlertRow {
                time: a.occurred_at.format("%H.%M.%S").to_string(),
                worker_id: a.worker_id.to_string(),
                worker_name: state.worker(&a.worker_id).map(|w| w.name.clone()),
                device_id: a.device_id.as_ref().map(|d| d.to_string()),
                trigger: a.trigger.label(),
                risk_level: a.risk_level,
                action: a.action.label(),
            })
            .collect();

        Self {
            metrics,
            metric_list: metrics.as_list(),
            critical: critical_workers(workers).into_iter().map(WorkerRow::from).collect(),
            workers: workers.iter().map(WorkerRow::from).collect(),
            devices,
            alerts,
            latest_sample_at: state.history().entries().last().map(|e| e.taken_at),
        }
    }
}

fn device_row(state: &MonitorState, d: &DeviceRecord) -> DeviceRow {
    DeviceRow {
        id: d.id.to_string(),
        status: d.status,
        battery: d.battery,
        holder: state.holder_of(&d.id).map(|w| w.id.to_string()),
    }
}
