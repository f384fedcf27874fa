#![no_main]
use libfuzzer_sys::fuzz_target;

// First line is the pattern, the rest is the haystack.
fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let (pattern, haystack) = text.split_once('\n').unwrap_or((&text, ""));
    let _ = stegtriage::strings::flags::search_custom_json(haystack, pattern, 50);
});
