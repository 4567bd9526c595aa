use axlekit_settings::{Config, ConfigError, SettingsError};
use tempfile::tempdir;

#[test]
fn test_toml_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.toml");

    let mut config = Config::default();
    config.set_var("axTypes", "A=1000x512_B=400x123_C=50x709").unwrap();
    config.set_var("seed", "99").unwrap();
    config.set_var("outDir", "programs").unwrap();
    config.save_to_file(&path).unwrap();

    let loaded = Config::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_json_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");

    let mut config = Config::default();
    config.set_var("maxSweeps", "25").unwrap();
    config.set_var("parallel", "0").unwrap();
    config.save_to_file(&path).unwrap();

    let loaded = Config::load_from_file(&path).unwrap();
    assert_eq!(loaded.planner.max_sweeps, Some(25));
    assert!(!loaded.planner.parallel);
}

#[test]
fn test_partial_file_fills_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    std::fs::write(
        &path,
        r#"
[machine]
bar_length = 3000

[[catalog]]
name = "X"
unit_length = 250
demand = 12
"#,
    )
    .unwrap();

    let loaded = Config::load_from_file(&path).unwrap();
    assert_eq!(loaded.machine.bar_length, 3000);
    assert_eq!(loaded.machine.cut_width, 5);
    assert_eq!(loaded.planner.restarts, 10);
    assert_eq!(loaded.catalog.index_of("X"), Some(0));
}

#[test]
fn test_invalid_values_rejected_on_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    std::fs::write(&path, "[planner]\nrestarts = 0\n").unwrap();

    let err = Config::load_from_file(&path).unwrap_err();
    assert!(matches!(
        err,
        SettingsError::Config(ConfigError::ValueOutOfRange { .. })
    ));
}
