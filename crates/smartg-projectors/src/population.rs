//! Population aggregator: risk-level counts over paired workers.

use serde::Serialize;
use smartg_core::{RiskLevel, WorkerState};

/// Counts by risk level. Unpaired workers are not counted anywhere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PopulationMetrics {
    pub safe: usize,
    pub warning: usize,
    pub danger: usize,
    pub total_paired: usize,
}

/// One named count, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PopulationMetric {
    pub name: &'static str,
    pub count: usize,
}

impl PopulationMetrics {
    pub fn as_list(&self) -> Vec<PopulationMetric> {
        vec![
            PopulationMetric { name: RiskLevel::Safe.label(), count: self.safe },
            PopulationMetric { name: RiskLevel::Warning.label(), count: self.warning },
            PopulationMetric { name: RiskLevel::Danger.label(), count: self.danger },
            PopulationMetric { name: "Total paired", count: self.total_paired },
        ]
    }

    pub fn count(&self, level: RiskLevel) -> usize {
        match level {
            RiskLevel::Safe => self.safe,
            RiskLevel::Warning => self.warning,
            RiskLevel::Danger => self.danger,
        }
    }
}

pub fn population_metrics(workers: &[WorkerState]) -> PopulationMetrics {
    let mut m = PopulationMetrics::default();
    for w in workers.iter().filter(|w| w.paired) {
        match w.risk_level {
            RiskLevel::Safe => m.safe += 1,
            RiskLevel::Warning => m.warning += 1,
            RiskLevel::Danger => m.danger += 1,
        }
        m.total_paired += 1;
    }
    m
}

/// Paired workers currently at Danger, in collection order.
pub fn critical_workers(workers: &[WorkerState]) -> Vec<&WorkerState> {
    workers
        .iter()
        .filter(|w| w.paired && w.risk_level == RiskLevel::Danger)
        .collect()
}
