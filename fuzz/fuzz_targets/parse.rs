#![no_main]

use cljfmt_syntax::ParseOptions;
use cljfmt_syntax::parser::parse_str;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Convert bytes to UTF-8 string (ignore invalid UTF-8)
    if let Ok(s) = std::str::from_utf8(data) {
        // Both modes must either build a tree or report an error, never panic
        let _ = parse_str("fuzz.clj", s, ParseOptions::new());
        let _ = parse_str("fuzz.clj", s, ParseOptions::non_semantic());
    }
});
