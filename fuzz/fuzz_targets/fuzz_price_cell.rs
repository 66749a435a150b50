#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let _ = epex_imbalance::auction::parse_price_text(text);
    let _ = epex_imbalance::auction::parse_window_label(text);
});
