use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Numeric boundaries per signal.
///
/// GSR and IMU are "higher is worse" signals, so their warning bound sits below the
/// critical bound. SpO2 is "lower is worse", so its warning bound sits above it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub gsr_warning: f64,
    pub gsr_critical: f64,
    pub imu_warning: f64,
    pub imu_critical: f64,
    pub spo2_warning: f64,
    pub spo2_critical: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            gsr_warning: 150.0, // microsiemens, dehydration / stress
            gsr_critical: 180.0,
            imu_warning: 0.9, // g, tremor amplitude
            imu_critical: 1.2,
            spo2_warning: 97.0, // percent saturation
            spo2_critical: 93.0,
        }
    }
}

impl Thresholds {
    /// Checks that every warning bound is strictly less dangerous than its critical bound.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let all = [
            self.gsr_warning,
            self.gsr_critical,
            self.imu_warning,
            self.imu_critical,
            self.spo2_warning,
            self.spo2_critical,
        ];
        if all.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::Thresholds("non-finite bound".into()));
        }
        if self.gsr_warning >= self.gsr_critical {
            return Err(ConfigError::Thresholds(format!(
                "gsr warning {} must be below critical {}",
                self.gsr_warning, self.gsr_critical
            )));
        }
        if self.imu_warning >= self.imu_critical {
            return Err(ConfigError::Thresholds(format!(
                "imu warning {} must be below critical {}",
                self.imu_warning, self.imu_critical
            )));
        }
        if self.spo2_warning <= self.spo2_critical {
            return Err(ConfigError::Thresholds(format!(
                "spo2 warning {} must be above critical {}",
                self.spo2_warning, self.spo2_critical
            )));
        }
        Ok(())
    }
}
