//! Integration tests for option resolution.

use std::fs;

use tempfile::TempDir;

use sews_cli::config::{OptionOverrides, load_options_file, resolve_options};
use sews_model::{PipelineOptions, ShortfallPolicy};

#[test]
fn defaults_without_config() {
    let options = resolve_options(None, &OptionOverrides::default()).unwrap();
    assert_eq!(options, PipelineOptions::default());
}

#[test]
fn partial_file_keeps_other_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sews.json");
    fs::write(
        &path,
        r#"{"negative_ratio": 2, "risk": {"high": 0.5}, "item_map": {"50813": "Lactate"}}"#,
    )
    .unwrap();

    let options = load_options_file(&path).unwrap();
    assert_eq!(options.negative_ratio, 2);
    assert_eq!(options.risk.high, 0.5);
    assert_eq!(options.risk.moderate, 0.15);
    assert_eq!(options.seed, 42);
    assert_eq!(options.item_map["50813"], "Lactate");
}

#[test]
fn flags_override_file_values() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sews.json");
    fs::write(&path, r#"{"seed": 7, "shortfall": "clamp"}"#).unwrap();

    let overrides = OptionOverrides {
        seed: Some(99),
        shortfall: Some(ShortfallPolicy::Fail),
        ..OptionOverrides::default()
    };
    let options = resolve_options(Some(path.as_path()), &overrides).unwrap();
    assert_eq!(options.seed, 99);
    assert_eq!(options.shortfall, ShortfallPolicy::Fail);
}

#[test]
fn invalid_values_are_rejected() {
    let overrides = OptionOverrides {
        test_fraction: Some(1.5),
        ..OptionOverrides::default()
    };
    let err = resolve_options(None, &overrides).unwrap_err();
    assert!(format!("{err:#}").contains("test_fraction"));
}

#[test]
fn missing_config_file_names_the_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.json");
    let err = resolve_options(Some(path.as_path()), &OptionOverrides::default()).unwrap_err();
    assert!(format!("{err:#}").contains("absent.json"));
}
