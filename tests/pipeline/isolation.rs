use crate::common::Fixture;
use std::time::Duration;
use stegtriage::tools::{ToolCommand, ToolStatus, NOT_FOUND_SENTINEL};

fn garbage_png() -> Fixture {
    let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
    bytes.extend_from_slice(b"not really an image, flag{still_found}\0");
    Fixture::new("broken.png", &bytes)
}

#[tokio::test]
async fn undecodable_image_fails_only_image_slots() {
    let fx = garbage_png();
    let report = fx.analyze().await;
    let slots = &report.slots;

    for (name, failure) in [
        ("color_channels", slots.color_channels.failure()),
        ("bitplanes", slots.bitplanes.failure()),
        ("lsb", slots.lsb.failure()),
        ("enhancements", slots.enhancements.failure()),
    ] {
        let failure = failure.unwrap_or_else(|| panic!("{} should fail", name));
        assert_eq!(failure.module, name);
        assert!(!failure.error.is_empty());
    }

    assert!(slots.file_info.is_ready());
    assert!(slots.header_footer.is_ready());
    assert!(slots.compression.is_ready());
    assert!(slots.strings.is_ready());
    assert!(slots.encodings.is_ready());

    let info = slots.file_info.ready().expect("file_info");
    assert!(info.sha256.is_some());
    assert_eq!(info.format, None);

    let hf = slots.header_footer.ready().expect("header_footer");
    assert_eq!(hf.valid_header, Some(true));
    assert_eq!(hf.valid_footer, Some(false));

    let flags = report.flags.ready().expect("flags");
    assert!(flags.flags.iter().any(|m| m.flag == "flag{still_found}"));
}

#[tokio::test]
async fn failures_serialize_as_error_objects() {
    let fx = garbage_png();
    let report = fx.analyze().await;
    let v = crate::common::to_value(&report);
    assert_eq!(v["lsb"]["module"], "lsb");
    assert!(v["lsb"]["error"].is_string());
    assert!(v["file_info"].get("error").is_none());

    let mut failed = report.slots.failed_modules();
    failed.sort();
    for name in ["bitplanes", "color_channels", "enhancements", "lsb"] {
        assert!(failed.contains(&name), "{} not in {:?}", name, failed);
    }
}

#[tokio::test]
async fn missing_binary_yields_sentinel() {
    let inv = ToolCommand::new("stegtriage-definitely-not-installed")
        .arg("--help")
        .timeout(Duration::from_secs(5))
        .run()
        .await;
    assert_eq!(inv.status, ToolStatus::NotFound);
    assert!(inv.is_not_found());
    assert!(inv.is_unavailable());
    assert_eq!(inv.returncode, None);
    assert_eq!(inv.stderr, NOT_FOUND_SENTINEL);
    assert_eq!(inv.cmd[0], "stegtriage-definitely-not-installed");
}

#[cfg(unix)]
#[tokio::test]
async fn slow_tool_times_out() {
    let inv = ToolCommand::new("sleep")
        .arg("5")
        .timeout(Duration::from_millis(200))
        .run()
        .await;
    assert!(inv.timed_out());
    assert!(inv.is_unavailable());
}
