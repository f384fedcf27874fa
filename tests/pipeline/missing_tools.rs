use crate::common::{png_with_trailer, test_config, to_value, Fixture};
use serde_json::json;
use stegtriage::analyzers::strings::StringsEngine;
use stegtriage::UnifiedReport;

/// Analyze with a PATH that holds no executables, as on a bare host.
async fn analyze_without_tools(fx: &Fixture) -> UnifiedReport {
    let empty = tempfile::tempdir().expect("tempdir");
    let mut config = test_config();
    config.tools.search_path = Some(empty.path().to_string_lossy().into_owned());
    fx.analyze_with(config).await
}

#[tokio::test]
async fn every_tool_slot_degrades_to_its_unavailable_shape() {
    let fx = Fixture::new("sample.png", &png_with_trailer(4, 4, "flag{no_tools_needed}"));
    let report = analyze_without_tools(&fx).await;
    let v = to_value(&report);

    assert_eq!(v["binwalk"]["summary"], "binwalk not installed on server");
    assert_eq!(v["binwalk"]["available"], false);
    assert_eq!(v["binwalk"]["extracted_paths"], json!([]));

    assert_eq!(v["steghide"]["available"], false);
    assert_eq!(v["steghide"]["info"]["stderr"], "steghide not installed on server");
    assert!(v["steghide"]["extract"].is_null());

    assert_eq!(
        v["exif"]["exiftool"],
        json!({"available": false, "error": "exiftool not installed on server"})
    );

    assert_eq!(v["zsteg"]["available"], false);

    assert_eq!(
        v["outguess_openstego"],
        json!({
            "outguess": {"available": false, "error": "outguess not installed"},
            "openstego": {"available": false, "error": "openstego not installed"},
        })
    );
}

#[tokio::test]
async fn strings_fall_back_to_native_scan() {
    let fx = Fixture::new("sample.png", &png_with_trailer(4, 4, "flag{no_tools_needed}"));
    let report = analyze_without_tools(&fx).await;

    let strings = report.slots.strings.ready().expect("strings");
    for section in [&strings.ascii, &strings.utf16] {
        assert_eq!(section.engine, StringsEngine::Native);
        assert!(!section.available);
        assert_eq!(section.cmd[0], "strings");
    }
    assert!(strings
        .ascii
        .sample
        .iter()
        .any(|line| line.contains("flag{no_tools_needed}")));

    let flags = report.flags.ready().expect("flags");
    assert!(flags
        .flags
        .iter()
        .any(|m| m.flag == "flag{no_tools_needed}" && m.source == "strings.ascii"));
}
