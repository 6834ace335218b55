#![no_main]

use libfuzzer_sys::fuzz_target;
use sweeplog::parser::LogParser;

fuzz_target!(|data: &[u8]| {
    // Logs are read lossily, so the parser must accept any decoded text
    let input = String::from_utf8_lossy(data);
    if let Ok(parser) = LogParser::new() {
        let parsed = parser.parse(&input);
        assert!(parsed.rows.len() <= input.lines().count());
    }
});
