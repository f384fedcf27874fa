use crate::common::{png_with_trailer, Fixture};
use std::io::Write;
use stegtriage::triage::pipeline::LEGACY_DISABLED;
use stegtriage::{Pipeline, PipelineConfig, Slot};

#[test]
fn config_file_overrides_only_named_fields() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(
        file,
        r#"{{"strings": {{"max_samples": 7}}, "legacy_tools": {{"enabled": false}}}}"#
    )
    .expect("write config");

    let config = PipelineConfig::from_json_file(file.path()).expect("config loads");
    assert_eq!(config.strings.max_samples, 7);
    assert!(!config.legacy_tools.enabled);
    assert_eq!(config.strings.min_length, 4);
    assert_eq!(config.tools.zsteg_secs, 300);
}

#[test]
fn missing_config_file_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    assert!(PipelineConfig::from_json_file(dir.path().join("absent.json")).is_err());
}

#[tokio::test]
async fn extra_prefixes_reach_flag_detection() {
    let fx = Fixture::new("sample.png", &png_with_trailer(4, 4, "picoCTF{extra_prefix}"));
    let mut config = crate::common::test_config();
    config.flags.extra_prefixes = vec!["picoCTF".into()];
    let report = fx.analyze_with(config).await;
    let flags = report.flags.ready().expect("flags");
    assert!(flags.flags.iter().any(|m| m.flag == "picoCTF{extra_prefix}"));
}

#[tokio::test]
async fn builtin_prefix_matches_inside_longer_token() {
    let fx = Fixture::new("sample.png", &png_with_trailer(4, 4, "picoCTF{extra_prefix}"));
    let report = fx.analyze().await;
    let flags = report.flags.ready().expect("flags");
    assert!(flags.flags.iter().any(|m| m.flag == "CTF{extra_prefix}"));
    assert!(flags.flags.iter().all(|m| !m.flag.starts_with("pico")));
}

#[tokio::test]
async fn disabled_legacy_tools_carry_reason() {
    let fx = Fixture::new("sample.png", &png_with_trailer(4, 4, "x"));
    let mut config = crate::common::test_config();
    config.legacy_tools.enabled = false;
    let report = fx.analyze_with(config).await;
    match &report.slots.outguess_openstego {
        Slot::Skipped(marker) => {
            assert!(marker.skipped);
            assert_eq!(marker.reason, LEGACY_DISABLED);
        }
        other => panic!("expected skip marker, got {:?}", other),
    }
}

#[test]
fn pipeline_exposes_its_config() {
    let mut config = PipelineConfig::default();
    config.flags.max_custom_matches = 3;
    let pipeline = Pipeline::new(config).expect("pipeline");
    assert_eq!(pipeline.config().flags.max_custom_matches, 3);
}
