use std::fs;

use chrono::Duration;
use tempfile::TempDir;
use trashkit::{PurgeTrigger, TrashApi, TrashConfig};

fn write_config(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("trash.toml");
    fs::write(&path, body).unwrap();
    path
}

#[test]
fn loads_values_from_toml_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "retention_days = 14\npurge_trigger = \"interval\"\npurge_interval_hours = 6\n",
    );

    let config = TrashConfig::load(Some(&path)).unwrap();
    assert_eq!(config.retention_days, 14);

    let policy = config.policy().unwrap();
    assert_eq!(policy.retention_window(), Duration::days(14));
    assert_eq!(
        policy.purge_trigger(),
        PurgeTrigger::Interval {
            every: Duration::hours(6)
        }
    );
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let config = TrashConfig::load(Some(&dir.path().join("absent.toml"))).unwrap();
    assert_eq!(config, TrashConfig::default());

    let api = TrashApi::from_config(&config).unwrap();
    assert_eq!(api.policy().retention_window(), Duration::days(7));
    assert_eq!(api.policy().purge_trigger(), PurgeTrigger::Manual);
}

#[test]
fn partial_file_keeps_remaining_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "purge_trigger = \"on-trash-view\"\n");

    let config = TrashConfig::load(Some(&path)).unwrap();
    assert_eq!(config.retention_days, 7);
    assert_eq!(config.purge_interval_hours, 24);
    assert_eq!(config.policy().unwrap().purge_trigger(), PurgeTrigger::OnTrashView);
}

#[test]
fn saved_config_loads_back() {
    let dir = TempDir::new().unwrap();
    let config = TrashConfig {
        retention_days: 30,
        purge_trigger: "manual".to_string(),
        purge_interval_hours: 12,
    };
    let path = write_config(&dir, &toml::to_string(&config).unwrap());

    assert_eq!(TrashConfig::load(Some(&path)).unwrap(), config);
}

#[test]
fn malformed_values_are_rejected() {
    let dir = TempDir::new().unwrap();

    let path = write_config(&dir, "retention_days = \"a week\"\n");
    assert!(TrashConfig::load(Some(&path)).is_err());

    let path = write_config(&dir, "retention_days = 0\n");
    let config = TrashConfig::load(Some(&path)).unwrap();
    assert!(config.policy().is_err());
    assert!(TrashApi::from_config(&config).is_err());

    let path = write_config(&dir, "retention_days = 106751\n");
    let config = TrashConfig::load(Some(&path)).unwrap();
    assert!(config.policy().is_err());

    let path = write_config(&dir, "purge_trigger = \"hourly\"\n");
    let config = TrashConfig::load(Some(&path)).unwrap();
    assert!(config.policy().is_err());
}
