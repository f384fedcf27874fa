#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    for ext in [".png", ".jpg", ".jpeg", ".bmp"] {
        let _ = stegtriage::analyzers::header_footer::check(ext, data);
    }
});
