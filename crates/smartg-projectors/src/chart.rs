//! Per-worker signal series for trend charts.

use serde::Serialize;
use smartg_core::{HistoryBuffer, WorkerId};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    /// `HH.MM.SS`
    pub time: String,
    pub value: f64,
}

/// Three aligned series, oldest point first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSeries {
    pub worker_id: Option<WorkerId>,
    pub gsr: Vec<ChartPoint>,
    pub imu: Vec<ChartPoint>,
    pub spo2: Vec<ChartPoint>,
}

impl ChartSeries {
    pub fn len(&self) -> usize {
        self.gsr.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gsr.is_empty()
    }
}

/// Last `window` history entries of one worker.
pub fn chart_series(history: &HistoryBuffer, worker_id: &WorkerId, window: usize) -> ChartSeries {
    let recent = history.recent_for_worker(worker_id, window);
    let mut series = ChartSeries {
        worker_id: Some(worker_id.clone()),
        gsr: Vec::with_capacity(recent.len()),
        imu: Vec::with_capacity(recent.len()),
        spo2: Vec::with_capacity(recent.len()),
    };
    for e in recent {
        let time = e.taken_at.format("%H.%M.%S").to_string();
        series.gsr.push(ChartPoint { time: time.clone(), value: e.gsr });
        series.imu.push(ChartPoint { time: time.clone(), value: e.imu });
        series.spo2.push(ChartPoint { time, value: e.spo2 });
    }
    series
}
