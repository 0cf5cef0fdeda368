#![no_main]
use libfuzzer_sys::fuzz_target;

use fast_count::report::summarize_reader;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    let cursor = Cursor::new([b"@", data].concat());
    if let Ok(summary) = summarize_reader("fuzz.fq", cursor) {
        let _ = summary.to_string();
    }
});
