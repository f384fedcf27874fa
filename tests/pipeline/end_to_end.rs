use crate::common::{bmp_bytes, jpeg_bytes, png_bytes, png_with_trailer, to_value, Fixture};
use stegtriage::core::report::SLOT_NAMES;
use stegtriage::Slot;

#[tokio::test]
async fn bmp_report_has_every_slot_and_skips_zsteg() {
    let fx = Fixture::new("sample.bmp", &bmp_bytes(8, 8));
    let report = fx.analyze().await;
    let v = to_value(&report);

    for key in SLOT_NAMES {
        assert!(v.get(key).is_some(), "missing slot {}", key);
        assert!(!v[key].is_null(), "null slot {}", key);
    }
    assert_eq!(
        v["zsteg"],
        serde_json::json!({"skipped": true, "reason": "zsteg is PNG-only"})
    );
    assert_eq!(v["session_id"], fx.session.id());
    assert!(report.slots.file_info.is_ready());
    assert!(report.flags.is_ready());
}

#[tokio::test]
async fn png_runs_zsteg_slot() {
    let fx = Fixture::new("sample.png", &png_bytes(8, 8));
    let report = fx.analyze().await;
    assert!(!report.slots.zsteg.is_skipped());
    let info = report.slots.file_info.ready().expect("file_info");
    assert_eq!(info.format.as_deref(), Some("PNG"));
    assert_eq!(info.mode.as_deref(), Some("RGBA"));
    let hf = report.slots.header_footer.ready().expect("header_footer");
    assert_eq!(hf.valid_header, Some(true));
    assert_eq!(hf.valid_footer, Some(true));
}

#[tokio::test]
async fn jpeg_is_decoded_and_validated() {
    let fx = Fixture::new("photo.JPEG", &jpeg_bytes(16, 8));
    let report = fx.analyze().await;
    let info = report.slots.file_info.ready().expect("file_info");
    assert_eq!(info.format.as_deref(), Some("JPEG"));
    assert_eq!(info.mode.as_deref(), Some("RGB"));
    let hf = report.slots.header_footer.ready().expect("header_footer");
    assert_eq!(hf.file_type.as_deref(), Some(".jpeg"));
    assert_eq!(hf.valid_header, Some(true));
    assert!(report.slots.zsteg.is_skipped());
}

#[tokio::test]
async fn base64_trailer_is_decoded() {
    let fx = Fixture::new("sample.png", &png_with_trailer(4, 4, "aGVsbG8gd29ybGQ="));
    let report = fx.analyze().await;
    let enc = report.slots.encodings.ready().expect("encodings");
    assert!(
        enc.base64
            .iter()
            .any(|c| c.source == "aGVsbG8gd29ybGQ=" && c.decoded == "hello world"),
        "base64 bucket: {:?}",
        enc.base64
    );
}

#[tokio::test]
async fn flag_in_strings_has_provenance() {
    let fx = Fixture::new("sample.png", &png_with_trailer(4, 4, "flag{appended_payload}"));
    let report = fx.analyze().await;
    let flags = report.flags.ready().expect("flags");
    assert!(flags
        .flags
        .iter()
        .any(|m| m.flag == "flag{appended_payload}" && m.source == "strings.ascii"));
    assert_eq!(flags.count, flags.flags.len());
}

#[tokio::test]
async fn bitplanes_match_source_dimensions() {
    let fx = Fixture::new("sample.png", &png_bytes(7, 5));
    let report = fx.analyze().await;
    let planes = report.slots.bitplanes.ready().expect("bitplanes");
    assert_eq!(planes.len(), 32);
    for (channel, bits) in &planes.planes {
        for (bit, r) in bits {
            assert_eq!(r.filename, format!("bitplane_{}_{}.png", channel, bit));
            let img = image::open(fx.session.dir().join(&r.filename))
                .expect("plane written")
                .to_luma8();
            assert_eq!(img.dimensions(), (7, 5));
            assert!(img.pixels().all(|p| p[0] == 0 || p[0] == 255));
        }
    }
}

#[tokio::test]
async fn compression_signatures_are_found() {
    let mut bytes = png_bytes(4, 4);
    bytes.extend_from_slice(b"PK\x03\x04payload");
    let fx = Fixture::new("sample.png", &bytes);
    let report = fx.analyze().await;
    let comp = report.slots.compression.ready().expect("compression");
    let zip_offset = bytes.len() - b"PK\x03\x04payload".len();
    assert!(comp
        .findings
        .iter()
        .any(|f| f.kind == "zip" && f.offset == zip_offset));
}

#[tokio::test]
async fn legacy_slot_can_be_disabled() {
    let fx = Fixture::new("sample.bmp", &bmp_bytes(4, 4));
    let mut config = crate::common::test_config();
    config.legacy_tools.enabled = false;
    let report = fx.analyze_with(config).await;
    assert!(matches!(report.slots.outguess_openstego, Slot::Skipped(_)));
}
