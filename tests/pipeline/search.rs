use crate::common::{png_with_trailer, test_config, Fixture};
use stegtriage::strings::flags::{merge_custom, search_custom, search_custom_json, CUSTOM_SOURCE};
use stegtriage::{Pipeline, StegError};

#[tokio::test]
async fn template_search_finds_flag_in_report() {
    let fx = Fixture::new("sample.png", &png_with_trailer(4, 4, "HTB{custom_search}"));
    let report = fx.analyze().await;
    let pipeline = Pipeline::new(test_config()).expect("pipeline");

    let found = pipeline.search(&report, "htb{}").expect("search");
    assert_eq!(found, vec!["HTB{custom_search}".to_string()]);

    // Not a default prefix, so automatic detection left it alone.
    let flags = report.flags.ready().expect("flags");
    assert!(flags.flags.iter().all(|m| m.flag != "HTB{custom_search}"));
}

#[tokio::test]
async fn merged_matches_are_tagged_custom() {
    let fx = Fixture::new(
        "sample.png",
        &png_with_trailer(4, 4, "HTB{one} flag{two}"),
    );
    let report = fx.analyze().await;
    let mut flags = report.flags.ready().cloned().expect("flags");
    let before = flags.count;

    let found = search_custom(&report, "HTB{}", 50).expect("search");
    merge_custom(&mut flags, &found);

    assert_eq!(flags.count, flags.flags.len());
    assert_eq!(flags.count, before + 1);
    let added = flags.flags.last().expect("merged match");
    assert_eq!(added.flag, "HTB{one}");
    assert_eq!(added.source, CUSTOM_SOURCE);
}

#[test]
fn raw_regex_and_cap() {
    let json = r#"{"a": "key-1 key-2 key-3 key-1"}"#;
    let found = search_custom_json(json, r"key-\d", 50).expect("search");
    assert_eq!(found, vec!["key-1", "key-2", "key-3"]);
    let capped = search_custom_json(json, r"key-\d", 2).expect("search");
    assert_eq!(capped.len(), 2);
}

#[test]
fn template_escapes_metacharacters() {
    let json = r#"{"a": "a.b{x} axb{y}"}"#;
    let found = search_custom_json(json, "a.b{}", 50).expect("search");
    assert_eq!(found, vec!["a.b{x}"]);
}

#[test]
fn invalid_regex_is_rejected() {
    let err = search_custom_json("{}", "([unclosed", 50).unwrap_err();
    assert!(matches!(err, StegError::InvalidInput(_)));
}
