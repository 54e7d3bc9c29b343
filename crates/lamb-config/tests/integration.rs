//! Integration tests for lamb-config.
//!
//! These tests verify end-to-end functionality: files on disk, validation
//! errors surfacing through `ConfigError`, and built modules running.

use lamb_config::{ConfigError, ModuleConfig, ValidationError};
use lamb_core::{ClockRatio, SequenceKind, StepPins};
use tempfile::TempDir;

const CONFIG: &str = r#"
sample_rate = 1000
buffer_size = 100

[clock]
timeout_secs = 5.0

[[lfo]]
frequency = 5.0

[[lfo]]
external_clock = true
ratio = "x2"

[[lfo]]
shape = "triangle"
duty = 0.9

[sequencer]
frequency = 10.0
sequence = "down"
skip = [false, false, false, false, false, false, true, false]
"#;

/// Save, reload and compare.
#[test]
fn test_save_and_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("module.toml");

    let config = ModuleConfig::from_toml(CONFIG).unwrap();
    config.save(&path).unwrap();
    assert!(path.exists());

    let loaded = ModuleConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_missing_file_reports_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");
    let err = ModuleConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFile { .. }));
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn test_malformed_toml() {
    let err = ModuleConfig::from_toml("sample_rate = \"fast\"").unwrap_err();
    assert!(matches!(err, ConfigError::TomlParse(_)));
}

#[test]
fn test_invalid_config_does_not_build() {
    let config = ModuleConfig::from_toml("[sequencer]\nsequence = \"reserved\"").unwrap();
    match config.build() {
        Err(ConfigError::Validation(ValidationError::UnknownSequence(name))) => {
            assert_eq!(name, "reserved");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

/// A built module runs with the configured timing and settings.
#[test]
fn test_built_module_runs() {
    let config = ModuleConfig::from_toml(CONFIG).unwrap();
    let mut module = config.build().unwrap();
    let sample_rate = config.sample_rate_hz();

    let mut a = vec![0.0_f32; config.buffer_size];
    let mut b = vec![0.0_f32; config.buffer_size];
    let mut c = vec![0.0_f32; config.buffer_size];

    // Clock at 2 Hz, channel B doubles it
    let mut steps = Vec::new();
    for buffer in 0..10 {
        if buffer % 5 == 0 {
            module.clock_pulse();
        }
        module.process(sample_rate, [&mut a[..], &mut b[..], &mut c[..]], |e| {
            steps.push(e.to);
        });
    }
    module.clock_pulse();
    module.process(sample_rate, [&mut a[..], &mut b[..], &mut c[..]], |e| {
        steps.push(e.to);
    });

    assert_eq!(module.channel(1).ratio(), ClockRatio::Mul2);
    assert!((module.channel(1).lfo().frequency() - 4.0).abs() < 1e-3);
    assert!((module.channel(0).lfo().frequency() - 5.0).abs() < 1e-6);

    // Down with step 6 skipped: 7, 5, 4, ...
    assert_eq!(
        module.sequencer().sequencer().sequence_kind(),
        SequenceKind::Down
    );
    assert_eq!(&steps[..3], &[7, 5, 4]);
    assert!(!steps.contains(&6));
    assert_eq!(StepPins::encode(steps[0]), [true, true, true]);
}

#[test]
fn test_clock_timeout_from_config() {
    let config = ModuleConfig::from_toml(CONFIG).unwrap();
    let module = config.build().unwrap();
    assert_eq!(module.clock().timeout(), 5.0);
}
