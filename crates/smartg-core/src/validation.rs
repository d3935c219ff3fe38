//! Input validation for user actions and device telemetry.

use crate::domain::{DeviceId, NewWorker, SensorReading};

pub const MIN_WORKER_AGE: u32 = 15;
pub const MAX_WORKER_AGE: u32 = 100;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("device id is empty")]
    EmptyDeviceId,
    #[error("device id {0:?} may only contain letters, digits and '-'")]
    MalformedDeviceId(String),
    #[error("worker name is empty")]
    EmptyName,
    #[error("age {0} outside 15..=100")]
    AgeOutOfRange(u32),
    #[error("reading rejected: {0}")]
    InvalidReading(&'static str),
}

/// Trim and upper-case a device id typed by an operator.
pub fn normalize_device_id(raw: &str) -> Result<DeviceId, ValidationError> {
    let id = raw.trim().to_uppercase();
    if id.is_empty() {
        return Err(ValidationError::EmptyDeviceId);
    }
    if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ValidationError::MalformedDeviceId(id));
    }
    Ok(DeviceId(id))
}

/// Returns the input with surrounding whitespace trimmed.
pub fn validate_new_worker(new: &NewWorker) -> Result<NewWorker, ValidationError> {
    let name = new.name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if !(MIN_WORKER_AGE..=MAX_WORKER_AGE).contains(&new.age) {
        return Err(ValidationError::AgeOutOfRange(new.age));
    }
    Ok(NewWorker {
        name: name.to_string(),
        occupation: new.occupation.trim().to_string(),
        age: new.age,
    })
}

/// Validate telemetry before it reaches the classifier, which assumes finite input.
pub fn validate_reading(r: &SensorReading) -> Result<(), ValidationError> {
    if [r.gsr, r.imu, r.spo2].iter().any(|v| v.is_nan() || v.is_infinite()) {
        return Err(ValidationError::InvalidReading("NaN/Inf detected"));
    }
    if r.gsr < 0.0 || r.imu < 0.0 {
        return Err(ValidationError::InvalidReading("negative gsr/imu"));
    }
    if !(0.0..=100.0).contains(&r.spo2) {
        return Err(ValidationError::InvalidReading("spo2 outside 0..=100"));
    }
    if r.taken_at.is_none() {
        return Err(ValidationError::InvalidReading("missing timestamp"));
    }
    Ok(())
}
