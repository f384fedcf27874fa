use crate::common::{png_bytes, Fixture};
use stegtriage::core::session::Session;
use stegtriage::triage::extraction;

#[tokio::test]
async fn side_effect_files_are_listed_with_urls() {
    let fx = Fixture::new("sample.png", &png_bytes(6, 6));
    let report = fx.analyze().await;
    let names: Vec<&str> = report
        .extracted_files
        .iter()
        .map(|f| f.name.as_str())
        .collect();

    for expected in [
        "input.png",
        "channel_R.png",
        "channel_A.png",
        "bitplane_r_0.png",
        "bitplane_a_7.png",
        "enh_invert.png",
        "enh_contrast.png",
    ] {
        assert!(names.contains(&expected), "{} missing from {:?}", expected, names);
    }
    for f in &report.extracted_files {
        assert_eq!(
            f.url,
            format!("/api/session/{}/files/{}", fx.session.id(), f.name)
        );
        assert!(!f.name.contains('\\'));
    }
}

#[tokio::test]
async fn listing_is_sorted_and_resolvable() {
    let fx = Fixture::new("sample.png", &png_bytes(4, 4));
    let report = fx.analyze().await;
    let names: Vec<String> = report
        .extracted_files
        .iter()
        .map(|f| f.name.clone())
        .collect();
    let mut sorted = names.clone();
    sorted.sort();
    // Top-level entries come back in byte order; nested carve output follows its parent.
    let top: Vec<&String> = names.iter().filter(|n| !n.contains('/')).collect();
    let sorted_top: Vec<&String> = sorted.iter().filter(|n| !n.contains('/')).collect();
    assert_eq!(top, sorted_top);

    let reopened = Session::open(fx.root.path(), fx.session.id()).expect("reopen");
    for name in &names {
        let path = reopened.resolve(name).expect("listed file resolves");
        assert!(path.is_file());
    }
}

#[tokio::test]
async fn rerun_in_same_session_is_stable() {
    let fx = Fixture::new("sample.png", &png_bytes(5, 5));
    let first = fx.analyze().await;
    let second = fx.analyze().await;
    let names = |r: &stegtriage::UnifiedReport| {
        r.extracted_files
            .iter()
            .map(|f| f.name.clone())
            .collect::<Vec<_>>()
    };
    assert_eq!(names(&first), names(&second));
    assert_eq!(first.session_id, second.session_id);
}

#[test]
fn scan_ignores_directories() {
    let root = tempfile::tempdir().expect("tempdir");
    let session = Session::create(root.path()).expect("session");
    std::fs::create_dir_all(session.dir().join("nested/deeper")).expect("mkdir");
    std::fs::write(session.dir().join("nested/deeper/carved.bin"), b"x").expect("write");
    std::fs::write(session.dir().join("top.txt"), b"y").expect("write");

    let files = extraction::scan(&session);
    let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["nested/deeper/carved.bin", "top.txt"]);
}
