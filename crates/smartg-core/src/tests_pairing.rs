#[cfg(test)]
mod tests {
    use crate::config::MonitorConfig;
    use crate::clock::SystemClock;
    use crate::domain::{DeviceId, DeviceRecord, DeviceStatus, NewWorker, RiskLevel, WorkerId, WorkerRecord};
    use crate::monitor::{Monitor, MonitorError};
    use crate::random::ScriptedRandom;
    use crate::store::{InMemoryStore, RecordStore, StoreError};
    use crate::validation::ValidationError;

    /// In-memory store whose operations can be made to fail.
    #[derive(Default)]
    struct FlakyStore {
        inner: InMemoryStore,
        fail_add: bool,
        fail_delete_worker: bool,
        fail_pair: bool,
        fail_unpair: bool,
        fail_delete_device: bool,
        register_calls: usize,
    }

    fn down() -> StoreError {
        StoreError::Backend("connection reset".into())
    }

    impl RecordStore for FlakyStore {
        fn fetch_workers(&mut self) -> Result<Vec<WorkerRecord>, StoreError> {
            self.inner.fetch_workers()
        }
        fn fetch_devices(&mut self) -> Result<Vec<DeviceRecord>, StoreError> {
            self.inner.fetch_devices()
        }
        fn add_worker(&mut self, new: &NewWorker) -> Result<WorkerRecord, StoreError> {
            if self.fail_add {
                return Err(down());
            }
            self.inner.add_worker(new)
        }
        fn delete_worker(&mut self, id: &WorkerId) -> Result<(), StoreError> {
            if self.fail_delete_worker {
                return Err(down());
            }
            self.inner.delete_worker(id)
        }
        fn register_device(&mut self, id: &DeviceId) -> Result<DeviceRecord, StoreError> {
            self.register_calls += 1;
            self.inner.register_device(id)
        }
        fn delete_device(&mut self, id: &DeviceId) -> Result<(), StoreError> {
            if self.fail_delete_device {
                return Err(down());
            }
            self.inner.delete_device(id)
        }
        fn pair_device(&mut self, worker: &WorkerId, device: &DeviceId) -> Result<(), StoreError> {
            if self.fail_pair {
                return Err(down());
            }
            self.inner.pair_device(worker, device)
        }
        fn unpair_device(&mut self, worker: &WorkerId, device: &DeviceId) -> Result<(), StoreError> {
            if self.fail_unpair {
                return Err(down());
            }
            self.inner.unpair_device(worker, device)
        }
    }

    fn monitor_on<S: RecordStore>(store: S) -> Monitor<S> {
        Monitor::with_sources(
            MonitorConfig::default(),
            store,
            Box::new(ScriptedRandom::new([0.5])),
            Box::new(SystemClock),
        )
    }

    fn hire<S: RecordStore>(m: &mut Monitor<S>, name: &str) -> WorkerId {
        m.add_worker(NewWorker { name: name.into(), occupation: "Painter".into(), age: 50 })
            .unwrap()
    }

    #[test]
    fn duplicate_device_rejected_before_storage() {
        let mut m = monitor_on(FlakyStore::default());
        let w1 = hire(&mut m, "Rudi");
        let w2 = hire(&mut m, "Agung");
        m.register_device("SGT-001A", &w1).unwrap();
        let before = m.state().digest();

        let err = m.register_device("  sgt-001a ", &w2).unwrap_err();
        assert!(matches!(err, MonitorError::DuplicateDevice(ref d) if d.as_str() == "SGT-001A"));
        assert_eq!(m.store().register_calls, 1);
        assert_eq!(m.state().digest(), before);
        assert!(!m.state().worker(&w2).unwrap().paired);
    }

    #[test]
    fn empty_device_id_is_a_validation_failure() {
        let mut m = monitor_on(FlakyStore::default());
        let w1 = hire(&mut m, "Rudi");
        let err = m.register_device("   ", &w1).unwrap_err();
        assert!(matches!(err, MonitorError::Validation(ValidationError::EmptyDeviceId)));
        assert_eq!(m.store().register_calls, 0);
    }

    #[test]
    fn failed_pairing_removes_registered_device() {
        let mut m = monitor_on(FlakyStore { fail_pair: true, ..FlakyStore::default() });
        let w1 = hire(&mut m, "Rudi");

        let err = m.register_device("SGT-009Z", &w1).unwrap_err();
        assert!(matches!(err, MonitorError::Pairing { orphaned: false, .. }));
        assert!(m.state().devices().is_empty());
        assert!(!m.state().worker(&w1).unwrap().paired);
        assert!(m.store().inner.clone().fetch_devices().unwrap().is_empty());
    }

    #[test]
    fn failed_compensation_reports_orphan() {
        let mut m = monitor_on(FlakyStore {
            fail_pair: true,
            fail_delete_device: true,
            ..FlakyStore::default()
        });
        let w1 = hire(&mut m, "Rudi");

        let err = m.register_device("SGT-009Z", &w1).unwrap_err();
        assert!(matches!(err, MonitorError::Pairing { orphaned: true, .. }));
        assert!(m.state().devices().is_empty());
        assert_eq!(m.store().inner.clone().fetch_devices().unwrap().len(), 1);
    }

    #[test]
    fn unpair_resets_worker_and_deactivates_device() {
        let mut m = monitor_on(FlakyStore::default());
        let w1 = hire(&mut m, "Rudi");
        m.register_device("SGT-001A", &w1).unwrap();
        m.tick();

        let device = m.unpair(&w1).unwrap();
        assert_eq!(device, DeviceId::from("SGT-001A"));
        let w = m.state().worker(&w1).unwrap();
        assert!(!w.paired);
        assert_eq!(w.risk_level, RiskLevel::Safe);
        assert!(w.last_reading.is_zeroed());
        assert_eq!(m.state().device(&device).unwrap().status, DeviceStatus::Inactive);
        assert!(matches!(m.unpair(&w1), Err(MonitorError::NotPaired(_))));
    }

    #[test]
    fn failed_unpair_leaves_state_intact() {
        let mut m = monitor_on(FlakyStore { fail_unpair: true, ..FlakyStore::default() });
        let w1 = hire(&mut m, "Rudi");
        m.register_device("SGT-001A", &w1).unwrap();
        let before = m.state().digest();
        assert!(matches!(m.unpair(&w1), Err(MonitorError::Store(_))));
        assert_eq!(m.state().digest(), before);
    }

    #[test]
    fn deleting_paired_worker_unpairs_first() {
        let mut m = monitor_on(FlakyStore::default());
        let w1 = hire(&mut m, "Rudi");
        m.register_device("SGT-001A", &w1).unwrap();
        m.delete_worker(&w1).unwrap();
        assert!(m.state().worker(&w1).is_none());
        let device = m.state().device(&DeviceId::from("SGT-001A")).unwrap();
        assert_eq!(device.status, DeviceStatus::Inactive);
    }

    #[test]
    fn failed_delete_keeps_worker() {
        let mut m = monitor_on(FlakyStore { fail_delete_worker: true, ..FlakyStore::default() });
        let w1 = hire(&mut m, "Rudi");
        assert!(matches!(m.delete_worker(&w1), Err(MonitorError::Store(_))));
        assert!(m.state().worker(&w1).is_some());
        assert!(matches!(
            m.delete_worker(&WorkerId::from("W9999")),
            Err(MonitorError::UnknownWorker(_))
        ));
    }

    #[test]
    fn failed_add_leaves_state_unchanged() {
        let mut m = monitor_on(FlakyStore { fail_add: true, ..FlakyStore::default() });
        let err = m
            .add_worker(NewWorker { name: "Rudi".into(), occupation: "Ironworker".into(), age: 61 })
            .unwrap_err();
        assert!(matches!(err, MonitorError::Store(StoreError::Backend(_))));
        assert!(m.state().workers().is_empty());
    }

    #[test]
    fn pairing_existing_devices_respects_status_and_holder() {
        let devices = vec![
            DeviceRecord { id: DeviceId::from("SGT-006F"), status: DeviceStatus::Maintenance, battery: 100.0 },
            DeviceRecord { id: DeviceId::from("SGT-007G"), status: DeviceStatus::Inactive, battery: 50.0 },
        ];
        let mut m = monitor_on(InMemoryStore::with_records(Vec::new(), devices));
        m.load().unwrap();
        let w1 = hire(&mut m, "Rudi");
        let w2 = hire(&mut m, "Agung");

        assert!(matches!(
            m.pair(&w1, "SGT-006F"),
            Err(MonitorError::DeviceUnavailable { status: DeviceStatus::Maintenance, .. })
        ));
        m.pair(&w1, "sgt-007g").unwrap();
        assert_eq!(
            m.state().device(&DeviceId::from("SGT-007G")).unwrap().status,
            DeviceStatus::Active
        );
        assert!(matches!(m.pair(&w2, "SGT-007G"), Err(MonitorError::DeviceInUse { .. })));
        assert!(matches!(m.pair(&w1, "SGT-404X"), Err(MonitorError::UnknownDevice(_))));
    }

    #[test]
    fn load_starts_everyone_safe_and_zeroed() {
        let workers = vec![WorkerRecord {
            id: WorkerId::from("W001"),
            name: "Bapak Rudi".into(),
            age: 61,
            occupation: "Ironworker".into(),
            device_id: Some(DeviceId::from("SGT-001A")),
            paired: true,
        }];
        let devices = vec![DeviceRecord {
            id: DeviceId::from("SGT-001A"),
            status: DeviceStatus::Active,
            battery: 85.0,
        }];
        let mut m = monitor_on(InMemoryStore::with_records(workers, devices));
        m.load().unwrap();
        let w = &m.state().workers()[0];
        assert!(w.paired);
        assert_eq!(w.risk_level, RiskLevel::Safe);
        assert!(w.last_reading.is_zeroed());
        assert_eq!(m.tick().samples.len(), 1);
    }
}
