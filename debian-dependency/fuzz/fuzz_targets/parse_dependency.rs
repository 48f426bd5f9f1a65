#![no_main]

use libfuzzer_sys::fuzz_target;
use debian_dependency::{Dependency, ParseOptions, Possibility, Relation};
use std::str::FromStr;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Err(e) = Dependency::from_str(s) {
            // Offsets must point into the input.
            assert!(usize::from(e.range().end()) <= s.len());
            assert!(s.is_char_boundary(e.offset()));
        }
        let _ = Dependency::parse_with(s, &ParseOptions::binary());
        let _ = Relation::from_str(s);
        let _ = Possibility::from_str(s);
    }
});
