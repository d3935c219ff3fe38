//! Reading -> risk level, plus the label of the signal that triggered it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{RiskLevel, SensorReading};
use crate::thresholds::Thresholds;

/// Classify a reading. Danger conditions are checked before Warning ones.
///
/// Inputs are assumed finite; use [`crate::validation::validate_reading`] at
/// ingestion boundaries that cannot guarantee it.
pub fn classify(t: &Thresholds, r: &SensorReading) -> RiskLevel {
    if r.gsr > t.gsr_critical || r.imu > t.imu_critical || r.spo2 < t.spo2_critical {
        return RiskLevel::Danger;
    }
    if r.gsr > t.gsr_warning || r.imu > t.imu_warning || r.spo2 < t.spo2_warning {
        return RiskLevel::Warning;
    }
    RiskLevel::Safe
}

/// Primary cause reported in an alert entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trigger {
    HighDehydration,
    ExtremeTremor,
    LowOxygen,
    GeneralFatigue,
}

impl Trigger {
    pub fn label(self) -> &'static str {
        match self {
            Trigger::HighDehydration => "High dehydration (GSR)",
            Trigger::ExtremeTremor => "Extreme tremor (IMU)",
            Trigger::LowOxygen => "Low oxygen (SpO2)",
            Trigger::GeneralFatigue => "General fatigue",
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Only critical bounds are checked, in gsr, imu, spo2 order. A Warning-level
/// reading therefore always reports [`Trigger::GeneralFatigue`].
pub fn primary_trigger(t: &Thresholds, r: &SensorReading) -> Trigger {
    if r.gsr > t.gsr_critical {
        Trigger::HighDehydration
    } else if r.imu > t.imu_critical {
        Trigger::ExtremeTremor
    } else if r.spo2 < t.spo2_critical {
        Trigger::LowOxygen
    } else {
        Trigger::GeneralFatigue
    }
}
