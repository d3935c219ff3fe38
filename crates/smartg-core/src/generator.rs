//! Synthetic readings for a target risk band.
//!
//! Stand-in for wristband telemetry. Ranges are chosen so a sample usually
//! classifies into its target band, but rounding at the edges lets it land in a
//! neighbouring band now and then. That noise is intended.

use chrono::{DateTime, Local};

use crate::domain::{RiskLevel, SensorReading};
use crate::random::RandomSource;

/// Half-open interval `[low, low + width)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalRange {
    pub low: f64,
    pub width: f64,
}

impl SignalRange {
    const fn new(low: f64, high: f64) -> Self {
        Self { low, width: high - low }
    }

    fn sample(&self, rng: &mut dyn RandomSource) -> f64 {
        round2(self.low + rng.next_unit() * self.width)
    }

    pub fn high(&self) -> f64 {
        self.low + self.width
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandRanges {
    pub gsr: SignalRange,
    pub imu: SignalRange,
    pub spo2: SignalRange,
}

impl BandRanges {
    pub const fn for_band(band: RiskLevel) -> Self {
        match band {
            RiskLevel::Danger => Self {
                gsr: SignalRange::new(180.0, 200.0),
                imu: SignalRange::new(1.2, 1.6),
                spo2: SignalRange::new(90.0, 92.0),
            },
            RiskLevel::Warning => Self {
                gsr: SignalRange::new(150.0, 180.0),
                imu: SignalRange::new(0.9, 1.2),
                spo2: SignalRange::new(93.0, 97.0),
            },
            RiskLevel::Safe => Self {
                gsr: SignalRange::new(100.0, 150.0),
                imu: SignalRange::new(0.4, 0.9),
                spo2: SignalRange::new(97.0, 100.0),
            },
        }
    }
}

/// Draw one reading for `band`. Consumes three values, in gsr, imu, spo2 order.
pub fn generate(band: RiskLevel, rng: &mut dyn RandomSource, taken_at: DateTime<Local>) -> SensorReading {
    let ranges = BandRanges::for_band(band);
    let gsr = ranges.gsr.sample(rng);
    let imu = ranges.imu.sample(rng);
    let spo2 = ranges.spo2.sample(rng);
    SensorReading::new(gsr, imu, spo2, taken_at)
}

/// Band used to seed the next sample.
///
/// One draw decides whether to jump; only on a jump is a second draw spent
/// picking the band uniformly. Otherwise the worker stays in `current`.
pub fn pick_target_band(current: RiskLevel, jump_probability: f64, rng: &mut dyn RandomSource) -> RiskLevel {
    if rng.next_unit() < jump_probability {
        let idx = (rng.next_unit() * RiskLevel::ALL.len() as f64) as usize;
        RiskLevel::ALL[idx.min(RiskLevel::ALL.len() - 1)]
    } else {
        current
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
