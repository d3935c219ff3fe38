//! Runtime configuration for the monitor.
//!
//! Loaded from an optional TOML file, then overridden by `SMARTG_*` environment
//! variables (nested keys separated by `__`, e.g. `SMARTG_SAMPLING__PERIOD_MS=1000`).

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::thresholds::Thresholds;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config source: {0}")]
    Source(#[from] config::ConfigError),
    #[error("invalid thresholds: {0}")]
    Thresholds(String),
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("render config: {0}")]
    Render(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub thresholds: Thresholds,
    pub sampling: SamplingConfig,
    pub logs: LogCapacity,
    pub battery: BatteryConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Period between ticks.
    pub period_ms: u64,
    /// Chance per worker per tick of seeding the sample from a random band.
    pub band_jump_probability: f64,
    pub simulation_enabled: bool,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            period_ms: 5_000,
            band_jump_probability: 0.05,
            simulation_enabled: true,
        }
    }
}

impl SamplingConfig {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogCapacity {
    pub alerts: usize,
    /// Shared by all workers, not per worker.
    pub history: usize,
    /// History entries per worker shown in charts.
    pub chart_window: usize,
}

impl Default for LogCapacity {
    fn default() -> Self {
        Self {
            alerts: 20,
            history: 200,
            chart_window: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatteryConfig {
    pub max_drain_per_tick: f64,
    /// Devices at or below this level stop draining.
    pub floor: f64,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            max_drain_per_tick: 0.5,
            floor: 5.0,
        }
    }
}

impl MonitorConfig {
    /// Load from `path` (if any) and the environment, then validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder = builder.add_source(
            config::Environment::with_prefix("SMARTG")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );
        let cfg: MonitorConfig = builder.build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let cfg: MonitorConfig = config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.thresholds.validate()?;
        if self.sampling.period_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "sampling.period_ms",
                reason: "must be positive".into(),
            });
        }
        if !(0.0..=1.0).contains(&self.sampling.band_jump_probability) {
            return Err(ConfigError::Invalid {
                field: "sampling.band_jump_probability",
                reason: format!("{} is not a probability", self.sampling.band_jump_probability),
            });
        }
        if self.logs.alerts == 0 || self.logs.history == 0 {
            return Err(ConfigError::Invalid {
                field: "logs",
                reason: "capacities must be positive".into(),
            });
        }
        if !self.battery.max_drain_per_tick.is_finite() || self.battery.max_drain_per_tick < 0.0 {
            return Err(ConfigError::Invalid {
                field: "battery.max_drain_per_tick",
                reason: "must be a non-negative number".into(),
            });
        }
        Ok(())
    }
}
