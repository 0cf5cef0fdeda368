#![no_main]
use libfuzzer_sys::fuzz_target;

use fast_count::parser::{FastaReader, FastxReader};
use fast_count::stats::LengthStats;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    let cursor = Cursor::new([b">", data].concat());
    let mut reader = FastaReader::new(cursor);
    if let Ok(stats) = LengthStats::from_reader(&mut reader) {
        let total = stats.total();
        let t = stats.thresholds();
        assert!(t.n01 >= t.n99);
        assert!((t.n01 as u64) <= total);
    }
});
