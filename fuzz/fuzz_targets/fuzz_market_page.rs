#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let html = String::from_utf8_lossy(data);

    // Any page must either yield windows or a typed error, never panic
    if let Ok(windows) = epex_imbalance::auction::parse_page(&html) {
        for w in &windows {
            let _ = w.contains(w.start);
        }
    }
});
