#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, Local, TimeZone};

    use crate::alert_log::AlertAction;
    use crate::classifier::{classify, Trigger};
    use crate::clock::SteppingClock;
    use crate::config::MonitorConfig;
    use crate::domain::{DeviceId, DeviceRecord, DeviceStatus, NewWorker, RiskLevel, SensorReading, WorkerId};
    use crate::monitor::Monitor;
    use crate::random::{ScriptedRandom, StdRandom};
    use crate::store::InMemoryStore;

    // Draws per tick for one paired worker and one active device:
    // jump check, band pick (on a jump), gsr, imu, spo2, battery.
    const JUMP: f64 = 0.01;
    const STAY: f64 = 0.9;
    const TO_WARNING: f64 = 0.5;
    const TO_DANGER: f64 = 0.9;
    const MID: f64 = 0.5;
    // Safe-band seed drawn when a device is paired.
    const SEED: [f64; 3] = [0.5, 0.5, 0.5];

    fn start() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
    }

    fn monitor(script: Vec<f64>) -> Monitor<InMemoryStore> {
        Monitor::with_sources(
            MonitorConfig::default(),
            InMemoryStore::new(),
            Box::new(ScriptedRandom::new(script)),
            Box::new(SteppingClock::new(start(), Duration::seconds(5))),
        )
    }

    fn hire(m: &mut Monitor<InMemoryStore>, name: &str) -> WorkerId {
        m.add_worker(NewWorker { name: name.into(), occupation: "Ironworker".into(), age: 45 })
            .unwrap()
    }

    #[test]
    fn danger_jump_logs_one_supervisor_alert() {
        let mut script = SEED.to_vec();
        script.extend([JUMP, TO_DANGER, MID, MID, MID, MID]);
        script.extend([STAY, MID, MID, MID, MID]);
        let mut m = monitor(script);
        let w1 = hire(&mut m, "Rudi");
        m.register_device("SGT-001A", &w1).unwrap();

        let report = m.tick();
        let sample = &report.samples[0];
        assert_eq!(sample.previous, RiskLevel::Safe);
        assert_eq!(sample.level, RiskLevel::Danger);
        assert_eq!(sample.reading.gsr, 190.0);
        assert_eq!(report.alerts.len(), 1);

        let entry = m.state().alerts().latest().unwrap();
        assert_eq!(entry.worker_id, w1);
        assert_eq!(entry.device_id, Some(DeviceId::from("SGT-001A")));
        assert_eq!(entry.trigger, Trigger::HighDehydration);
        assert_eq!(entry.action, AlertAction::SupervisorNotification);
        assert_eq!(entry.risk_level, RiskLevel::Danger);

        // staying in Danger is not an escalation
        let report = m.tick();
        assert_eq!(report.samples[0].level, RiskLevel::Danger);
        assert!(report.alerts.is_empty());
        assert_eq!(m.state().alerts().len(), 1);
    }

    #[test]
    fn alert_log_keeps_twenty_newest_first() {
        let mut script = SEED.to_vec();
        for tick in 1..=25 {
            let band = if tick % 2 == 1 { TO_WARNING } else { TO_DANGER };
            script.extend([JUMP, band, MID, MID, MID, MID]);
        }
        let mut m = monitor(script);
        let w1 = hire(&mut m, "Agung");
        m.register_device("SGT-002B", &w1).unwrap();

        for _ in 0..25 {
            let report = m.tick();
            assert_eq!(report.alerts.len(), 1);
            assert!(m.state().alerts().len() <= 20);
        }

        let entries: Vec<_> = m.state().alerts().entries().collect();
        assert_eq!(entries.len(), 20);
        assert_eq!(entries[0].risk_level, RiskLevel::Warning);
        assert_eq!(entries[0].action, AlertAction::DeviceVibration);
        assert_eq!(entries[1].risk_level, RiskLevel::Danger);
        assert!(entries.windows(2).all(|p| p[0].occurred_at > p[1].occurred_at));
        // clock: one read at pairing, then one per tick; tick 6 is the oldest kept
        assert_eq!(entries[19].occurred_at, start() + Duration::seconds(5 * 6));
    }

    #[test]
    fn downgrade_from_danger_to_warning_is_logged() {
        let mut script = SEED.to_vec();
        script.extend([JUMP, TO_DANGER, MID, MID, MID, MID]);
        script.extend([JUMP, TO_WARNING, MID, MID, MID, MID]);
        let mut m = monitor(script);
        let w1 = hire(&mut m, "Budi");
        m.register_device("SGT-003C", &w1).unwrap();
        m.tick();
        let report = m.tick();
        assert_eq!(report.samples[0].level, RiskLevel::Warning);
        let entry = &report.alerts[0];
        assert_eq!(entry.trigger, Trigger::GeneralFatigue);
        assert_eq!(entry.action, AlertAction::DeviceVibration);
        assert_eq!(m.state().alerts().len(), 2);
    }

    #[test]
    fn return_to_safe_is_not_logged() {
        let mut script = SEED.to_vec();
        script.extend([JUMP, TO_DANGER, MID, MID, MID, MID]);
        script.extend([JUMP, 0.0, MID, MID, MID, MID]);
        let mut m = monitor(script);
        let w1 = hire(&mut m, "Taufiq");
        m.register_device("SGT-004D", &w1).unwrap();
        m.tick();
        let report = m.tick();
        assert_eq!(report.samples[0].level, RiskLevel::Safe);
        assert!(report.alerts.is_empty());
    }

    #[test]
    fn history_is_bounded_globally() {
        let mut m = Monitor::with_sources(
            MonitorConfig::default(),
            InMemoryStore::new(),
            Box::new(StdRandom::seeded(42)),
            Box::new(SteppingClock::new(start(), Duration::seconds(5))),
        );
        for (i, name) in ["Rudi", "Agung", "Budi"].iter().enumerate() {
            let id = hire(&mut m, name);
            m.register_device(&format!("SGT-00{i}X"), &id).unwrap();
        }
        let mut last = None;
        for _ in 0..100 {
            last = Some(m.tick().ticked_at);
            assert!(m.state().history().len() <= 200);
        }
        let history: Vec<_> = m.state().history().entries().collect();
        assert_eq!(history.len(), 200);
        assert!(history[197..].iter().all(|e| Some(e.taken_at) == last));
    }

    #[test]
    fn level_always_matches_classification() {
        let mut m = Monitor::with_sources(
            MonitorConfig::default(),
            InMemoryStore::new(),
            Box::new(StdRandom::seeded(7)),
            Box::new(SteppingClock::new(start(), Duration::seconds(5))),
        );
        for i in 0..5 {
            let id = hire(&mut m, &format!("Worker {i}"));
            m.register_device(&format!("SGT-10{i}A"), &id).unwrap();
        }
        let thresholds = m.config().thresholds;
        for _ in 0..200 {
            m.tick();
            for w in m.state().workers() {
                assert_eq!(w.risk_level, classify(&thresholds, &w.last_reading));
            }
        }
    }

    #[test]
    fn unpaired_workers_are_not_sampled() {
        let mut m = monitor(Vec::from(SEED));
        let paired = hire(&mut m, "Jaya");
        let idle = hire(&mut m, "Reserve A");
        m.register_device("SGT-005E", &paired).unwrap();

        let report = m.tick();
        assert_eq!(report.samples.len(), 1);
        assert_eq!(m.state().history().for_worker(&idle).count(), 0);
        let idle_state = m.state().worker(&idle).unwrap();
        assert_eq!(idle_state.risk_level, RiskLevel::Safe);
        assert!(idle_state.last_reading.is_zeroed());
    }

    #[test]
    fn only_active_devices_above_floor_drain() {
        let devices = vec![
            DeviceRecord { id: DeviceId::from("SGT-001A"), status: DeviceStatus::Active, battery: 85.0 },
            DeviceRecord { id: DeviceId::from("SGT-006F"), status: DeviceStatus::Maintenance, battery: 100.0 },
            DeviceRecord { id: DeviceId::from("SGT-007G"), status: DeviceStatus::Inactive, battery: 50.0 },
            DeviceRecord { id: DeviceId::from("SGT-008H"), status: DeviceStatus::Active, battery: 5.0 },
        ];
        let mut m = Monitor::with_sources(
            MonitorConfig::default(),
            InMemoryStore::with_records(Vec::new(), devices),
            Box::new(ScriptedRandom::new([0.5])),
            Box::new(SteppingClock::new(start(), Duration::seconds(5))),
        );
        m.load().unwrap();
        m.tick();
        let battery: Vec<f64> = m.state().devices().iter().map(|d| d.battery).collect();
        assert_eq!(battery, vec![84.75, 100.0, 50.0, 5.0]);
    }

    #[test]
    fn disabled_simulation_skips_ticks() {
        let mut m = monitor(Vec::from(SEED));
        let w1 = hire(&mut m, "Rudi");
        m.register_device("SGT-001A", &w1).unwrap();
        assert!(m.should_sample());
        m.set_simulation_enabled(false);
        assert!(m.tick_if_enabled().is_none());
        assert!(m.state().history().is_empty());
    }

    #[test]
    fn ingested_telemetry_follows_tick_rules() {
        let mut m = monitor(Vec::from(SEED));
        let w1 = hire(&mut m, "Rudi");
        m.register_device("SGT-001A", &w1).unwrap();

        let sample = m
            .ingest_reading(&w1, SensorReading::new(120.0, 1.4, 98.0, start()))
            .unwrap();
        assert_eq!(sample.level, RiskLevel::Danger);
        let entry = m.state().alerts().latest().unwrap();
        assert_eq!(entry.trigger, Trigger::ExtremeTremor);
        assert_eq!(m.state().history().len(), 1);

        let bad = SensorReading::new(f64::INFINITY, 0.5, 98.0, start());
        assert!(m.ingest_reading(&w1, bad).is_err());
        assert_eq!(m.state().history().len(), 1);
    }
}
