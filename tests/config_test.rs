//! Configuration file handling

use face_guidance::{
    config::{Config, EXAMPLE_CONFIG},
    Error,
};
use std::io::Write;

#[test]
fn test_config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("guidance.yaml");

    let mut config = Config::default();
    config.guidance.tolerance = 45;
    config.guidance.reset_on_pause = true;
    config.speech.backend = "espeak".to_string();
    config.to_file(&path).unwrap();

    let loaded = Config::from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_example_config_file_loads() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(EXAMPLE_CONFIG.as_bytes()).unwrap();

    let config = Config::from_file(file.path()).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.guidance.stable_frames, 7);
    assert_eq!(config.lighting.low_light_threshold, 60.0);
}

#[test]
fn test_missing_file() {
    let result = Config::from_file("/nonexistent/guidance.yaml");
    assert!(matches!(result, Err(Error::IoError(_))));
}

#[test]
fn test_wrong_types_rejected() {
    let result = Config::from_yaml("guidance:\n  stable_frames: many\n");
    match result {
        Err(Error::ConfigError(msg)) => assert!(msg.contains("Failed to parse config")),
        other => panic!("Expected ConfigError, got {other:?}"),
    }
}

#[test]
fn test_validation_messages() {
    let mut config = Config::default();
    config.gesture.open_hand_min_fingers = 6;
    match config.validate() {
        Err(Error::ConfigError(msg)) => assert!(msg.contains("Open hand")),
        other => panic!("Expected ConfigError, got {other:?}"),
    }

    let mut config = Config::default();
    config.speech.volume = 1.5;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.host.frame_interval_ms = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.metrics.history_capacity = 0;
    assert!(config.validate().is_err());
}
