use crate::config::settings::*;
use crate::config::ConfigError;
use crate::core::types::ChordKind;
use std::time::Duration;

#[test]
fn test_defaults() {
    let settings = Settings::default();

    assert!((settings.delay - 3333.0 / 80.0).abs() < 1e-9);
    assert!(!settings.set_delay_manually);
    assert!(!settings.shows_notice(ChordKind::Text));
    assert!(!settings.shows_notice(ChordKind::Template));
    assert!(!settings.shows_notice(ChordKind::File));
    assert!(settings.shows_notice(ChordKind::Command));
    assert!(settings.chords.is_empty());
}

#[test]
fn test_wpm_delay_conversion() {
    assert!((wpm_to_delay(80.0) - 41.6625).abs() < 1e-9);
    assert!((delay_to_wpm(wpm_to_delay(63.0)) - 63.0).abs() < 1e-9);
}

#[test]
fn test_partial_json_fills_defaults() {
    let json = r#"{
        "delay": 30,
        "chords": [{"key": "sv", "value": "Save current file", "chordType": "Command"}]
    }"#;

    let settings: Settings = serde_json::from_str(json).unwrap();

    assert_eq!(settings.delay, 30.0);
    assert!(settings.show_command_chord_executed);
    assert_eq!(settings.chords.len(), 1);
    assert_eq!(settings.chords[0].kind, ChordKind::Command);
}

#[test]
fn test_json_uses_camel_case() {
    let json = serde_json::to_string(&Settings::default()).unwrap();

    for field in [
        "\"delay\"",
        "\"setDelayManually\"",
        "\"showTextChordExecuted\"",
        "\"showTemplateChordExecuted\"",
        "\"showFileChordExecuted\"",
        "\"showCommandChordExecuted\"",
        "\"chords\"",
    ] {
        assert!(json.contains(field), "missing {} in {}", field, json);
    }
}

#[test]
fn test_delay_duration() {
    let mut settings = Settings::default();

    settings.delay = 40.0;
    assert_eq!(settings.delay_duration(), Duration::from_millis(40));

    settings.delay = -3.0;
    assert_eq!(settings.delay_duration(), Duration::ZERO);

    settings.delay = f64::NAN;
    assert_eq!(settings.delay_duration(), Duration::ZERO);
}

#[test]
fn test_set_notice_per_kind() {
    let mut settings = Settings::default();

    for kind in ChordKind::ALL {
        settings.set_notice(kind, true);
        assert!(settings.shows_notice(kind));
        settings.set_notice(kind, false);
        assert!(!settings.shows_notice(kind));
    }
}

#[test]
fn test_validate_delay() {
    assert_eq!(validate_delay(0.0).unwrap(), 0.0);
    assert_eq!(validate_delay(41.5).unwrap(), 41.5);
    assert!(matches!(validate_delay(-1.0), Err(ConfigError::InvalidNumber(_))));
    assert!(validate_delay(f64::NAN).is_err());
    assert!(validate_delay(f64::INFINITY).is_err());
}

#[test]
fn test_validate_wpm_rejects_zero() {
    assert_eq!(validate_wpm(80.0).unwrap(), 80.0);
    assert!(validate_wpm(0.0).is_err());
    assert!(validate_wpm(-10.0).is_err());

    let err = validate_wpm(f64::NAN).unwrap_err();
    assert_eq!(err.to_string(), "Specify a valid number.");
}

#[test]
fn test_validate_delay_upper_bound() {
    assert_eq!(validate_delay(MAX_DELAY_MS).unwrap(), MAX_DELAY_MS);
    assert!(matches!(validate_delay(MAX_DELAY_MS + 1.0), Err(ConfigError::InvalidNumber(_))));
    assert!(validate_delay(1e300).is_err());
}

#[test]
fn test_validate_wpm_checks_derived_delay() {
    // 3333 / 0.05 = 66660 ms, above the maximum
    assert!(validate_wpm(0.05).is_err());
    assert!(validate_wpm(1e-300).is_err());
    assert!(validate_wpm(f64::MIN_POSITIVE).is_err());
    assert!(validate_wpm(1.0).is_ok());
}

#[test]
fn test_huge_stored_delay_is_clamped() {
    let settings: Settings = serde_json::from_str(r#"{"delay": 1e300}"#).unwrap();

    assert_eq!(settings.delay_duration(), Duration::from_secs(60));
}

#[test]
fn test_numeric_chord_type_loads() {
    let json = r#"{"delay":41.6625,"chords":[
        {"key":"ab","value":"x","chordType":0},
        {"key":"sv","value":"Save current file","chordType":1},
        {"key":"tp","value":"t.md","chordType":"Template"},
        {"key":"fl","value":"f.md","chordType":3}
    ]}"#;

    let settings: Settings = serde_json::from_str(json).unwrap();

    let kinds: Vec<ChordKind> = settings.chords.iter().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        vec![ChordKind::Text, ChordKind::Command, ChordKind::Template, ChordKind::File]
    );

    // Written back by name
    let written = serde_json::to_string(&settings).unwrap();
    assert!(written.contains(r#""chordType":"Text""#));
}

#[test]
fn test_unknown_chord_type_index_rejected() {
    let json = r#"{"chords":[{"key":"ab","value":"x","chordType":4}]}"#;

    assert!(serde_json::from_str::<Settings>(json).is_err());
}
