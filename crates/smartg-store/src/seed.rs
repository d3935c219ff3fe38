//! Demo roster: six site workers and seven wristbands.

use smartg_core::{DeviceId, DeviceRecord, DeviceStatus, WorkerId, WorkerRecord};

pub fn demo_workers() -> Vec<WorkerRecord> {
    let rows: [(&str, &str, u32, &str, Option<&str>); 6] = [
        ("W001", "Bapak Rudi", 61, "Ironworker", Some("SGT-001A")),
        ("W002", "Bapak Agung", 55, "Foreman", Some("SGT-002B")),
        ("W003", "Pak Budi", 65, "Painter", Some("SGT-003C")),
        ("W004", "Mas Taufiq", 32, "Electrician", Some("SGT-004D")),
        ("W005", "Bapak Jaya", 58, "Carpenter", Some("SGT-005E")),
        ("W006", "Reserve A", 40, "Reserve", None),
    ];
    rows.into_iter()
        .map(|(id, name, age, occupation, device)| WorkerRecord {
            id: WorkerId::from(id),
            name: name.to_string(),
            age,
            occupation: occupation.to_string(),
            device_id: device.map(DeviceId::from),
            paired: device.is_some(),
        })
        .collect()
}

pub fn demo_devices() -> Vec<DeviceRecord> {
    [
        ("SGT-001A", DeviceStatus::Active, 85.0),
        ("SGT-002B", DeviceStatus::Active, 78.0),
        ("SGT-003C", DeviceStatus::Active, 92.0),
        ("SGT-004D", DeviceStatus::Active, 65.0),
        ("SGT-005E", DeviceStatus::Active, 99.0),
        ("SGT-006F", DeviceStatus::Maintenance, 100.0),
        ("SGT-007G", DeviceStatus::Inactive, 50.0),
    ]
    .into_iter()
    .map(|(id, status, battery)| DeviceRecord { id: DeviceId::from(id), status, battery })
    .collect()
}
