use std::fs;

use assert_matches::assert_matches;

use casemap::config::{Config, ConfigLoader, MarkerEntry, DEFAULT_MAX_LOOKBACK};
use casemap::error::CaseMapError;
use casemap::pipeline::PipelineSettings;

#[test]
fn loads_json_file() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("casemap.json");
    fs::write(
        &path,
        r#"{
            "max_lookback": 5,
            "marker": { "size_per_digit": 6 },
            "default_center": { "latitude": 45.0, "longitude": 9.0 },
            "source_url_template": "https://mirror.example.org/reports/{date}.csv"
        }"#,
    )
    .unwrap();

    let resolved = ConfigLoader::resolve(path.to_str()).unwrap();
    assert_eq!(resolved.max_lookback, 5);
    assert_eq!(resolved.marker.base_size, 10);
    assert_eq!(resolved.marker.size_per_digit, 6);
    assert_eq!(resolved.default_center.latitude, 45.0);
    assert_eq!(
        resolved.source_url_template,
        "https://mirror.example.org/reports/{date}.csv"
    );

    let settings = PipelineSettings::from(&resolved);
    assert_eq!(settings.max_lookback, 5);
}

#[test]
fn missing_explicit_file_is_an_error() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("absent.json");
    let err = ConfigLoader::resolve(path.to_str()).unwrap_err();
    assert_matches!(err, CaseMapError::ConfigRead(_));
}

#[test]
fn malformed_json_is_an_error() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("casemap.json");
    fs::write(&path, "{ max_lookback: ").unwrap();
    let err = ConfigLoader::resolve(path.to_str()).unwrap_err();
    assert_matches!(err, CaseMapError::ConfigParse(_));
}

#[test]
fn template_without_placeholder_is_rejected() {
    let config = Config {
        source_url_template: Some("https://example.org/latest.csv".to_string()),
        ..Config::default()
    };
    let err = ConfigLoader::resolve_config(config).unwrap_err();
    assert_matches!(err, CaseMapError::InvalidConfig(_));
}

#[test]
fn zero_lookback_is_rejected() {
    let config = Config {
        max_lookback: Some(0),
        ..Config::default()
    };
    let err = ConfigLoader::resolve_config(config).unwrap_err();
    assert_matches!(err, CaseMapError::InvalidConfig(_));
}

#[test]
fn partial_marker_section_keeps_other_default() {
    let config = Config {
        marker: Some(MarkerEntry {
            base_size: Some(4),
            size_per_digit: None,
        }),
        ..Config::default()
    };
    let resolved = ConfigLoader::resolve_config(config).unwrap();
    assert_eq!(resolved.marker.base_size, 4);
    assert_eq!(resolved.marker.size_per_digit, 10);
    assert_eq!(resolved.max_lookback, DEFAULT_MAX_LOOKBACK);
}
