use crate::common::{bmp_bytes, png_bytes, test_config, to_value, Fixture};
use stegtriage::core::report::SLOT_NAMES;
use stegtriage::{run_full_analysis, Pipeline, StegError};

#[test]
fn analyze_blocking_fills_every_slot() {
    let fx = Fixture::new("sample.bmp", &bmp_bytes(6, 4));
    let pipeline = Pipeline::new(test_config()).expect("pipeline");
    let report = pipeline
        .analyze_blocking(fx.artifact(), fx.session.clone())
        .expect("runtime");

    let v = to_value(&report);
    for key in SLOT_NAMES {
        assert!(!v[key].is_null(), "null slot {}", key);
    }
    assert!(report.slots.bitplanes.is_ready());
    assert!(report.slots.zsteg.is_skipped());
    assert!(report.extracted_files.iter().any(|f| f.name == "input.bmp"));
}

#[tokio::test]
async fn run_full_analysis_loads_from_path() {
    let fx = Fixture::new("sample.png", &png_bytes(4, 4));
    let report = run_full_analysis(&fx.path, fx.session.clone(), test_config())
        .await
        .expect("report");
    assert_eq!(report.session_id, fx.session.id());
    let info = report.slots.file_info.ready().expect("file_info");
    assert_eq!(info.size_bytes, Some(png_bytes(4, 4).len() as u64));
}

#[tokio::test]
async fn run_full_analysis_rejects_oversized_artifact() {
    let fx = Fixture::new("sample.png", &png_bytes(8, 8));
    let mut config = test_config();
    config.io.max_file_size = 16;
    let err = run_full_analysis(&fx.path, fx.session.clone(), config)
        .await
        .unwrap_err();
    assert!(matches!(err, StegError::Limits(_)), "{:?}", err);
}
