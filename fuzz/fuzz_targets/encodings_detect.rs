#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let cfg = stegtriage::triage::config::EncodingsConfig::default();
    let text = String::from_utf8_lossy(data);
    let _ = stegtriage::strings::encodings::detect_candidates(text.split('\n'), &cfg);
});
