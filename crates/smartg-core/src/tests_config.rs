#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use crate::config::{ConfigError, MonitorConfig};
    use crate::thresholds::Thresholds;

    #[test]
    fn defaults_match_threshold_table() {
        let cfg = MonitorConfig::default();
        assert_eq!(cfg.thresholds, Thresholds::default());
        assert_eq!(cfg.thresholds.gsr_warning, 150.0);
        assert_eq!(cfg.thresholds.spo2_critical, 93.0);
        assert_eq!(cfg.sampling.period(), Duration::from_secs(5));
        assert_eq!(cfg.logs.alerts, 20);
        assert_eq!(cfg.logs.history, 200);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn loads_file_and_keeps_defaults_for_missing_keys() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[sampling]\nperiod_ms = 1000\n\n[thresholds]\ngsr_warning = 140.0\n"
        )
        .unwrap();

        let cfg = MonitorConfig::load(Some(file.path())).unwrap();
        assert_eq!(cfg.sampling.period_ms, 1000);
        assert_eq!(cfg.sampling.band_jump_probability, 0.05);
        assert_eq!(cfg.thresholds.gsr_warning, 140.0);
        assert_eq!(cfg.thresholds.gsr_critical, 180.0);
        assert_eq!(cfg.battery.floor, 5.0);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(matches!(MonitorConfig::load(Some(&path)), Err(ConfigError::Source(_))));
    }

    #[test]
    fn inverted_thresholds_rejected() {
        let raw = "[thresholds]\nspo2_warning = 90.0\nspo2_critical = 93.0\n";
        assert!(matches!(MonitorConfig::from_toml_str(raw), Err(ConfigError::Thresholds(_))));
        let raw = "[thresholds]\ngsr_critical = 120.0\n";
        assert!(matches!(MonitorConfig::from_toml_str(raw), Err(ConfigError::Thresholds(_))));
    }

    #[test]
    fn bad_sampling_values_rejected() {
        let raw = "[sampling]\nperiod_ms = 0\n";
        assert!(matches!(
            MonitorConfig::from_toml_str(raw),
            Err(ConfigError::Invalid { field: "sampling.period_ms", .. })
        ));
        let raw = "[sampling]\nband_jump_probability = 1.5\n";
        assert!(matches!(MonitorConfig::from_toml_str(raw), Err(ConfigError::Invalid { .. })));
        let raw = "[logs]\nalerts = 0\n";
        assert!(matches!(MonitorConfig::from_toml_str(raw), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn rendered_config_parses_back() {
        let mut cfg = MonitorConfig::default();
        cfg.sampling.period_ms = 2500;
        cfg.thresholds.imu_warning = 0.8;
        let rendered = cfg.to_toml_string().unwrap();
        assert!(rendered.contains("period_ms = 2500"));
        assert_eq!(MonitorConfig::from_toml_str(&rendered).unwrap(), cfg);
    }
}
