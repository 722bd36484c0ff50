#![no_main]

use cljfmt::format_source;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Anything that formats once must format to itself
        if let Ok(once) = format_source(s) {
            let twice = format_source(&once).expect("formatted output should parse");
            assert_eq!(once, twice);
        }
    }
});
