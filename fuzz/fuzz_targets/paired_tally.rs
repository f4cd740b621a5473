#![no_main]

use insttally::input::split_lines;
use insttally::tally::Tally;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let lines: Vec<&str> = split_lines(input).collect();
        // Malformed traces must surface as errors, never panics
        let _ = Tally::from_paired_lines(&lines);
        let _ = Tally::from_lines(&lines);
    }
});
