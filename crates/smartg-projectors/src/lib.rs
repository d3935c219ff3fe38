//! Read-side projections over the monitor state for presentation layers.

pub mod chart;
pub mod dashboard;
pub mod population;

pub use chart::{chart_series, ChartPoint, ChartSeries};
pub use dashboard::{AlertRow, DashboardSnapshot, DeviceRow, WorkerRow};
pub use population::{critical_workers, population_metrics, PopulationMetric, PopulationMetrics};
