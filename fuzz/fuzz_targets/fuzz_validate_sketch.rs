//! Fuzz target: relative include screening.
//!
//! Cross-checks the validator against a hand-written scanner.
#![no_main]

use libfuzzer_sys::fuzz_target;

fn has_relative_include(sketch: &str) -> bool {
    sketch.match_indices('#').any(|(at, _)| {
        let rest = sketch[at + 1..].trim_start();
        let Some(rest) = rest.strip_prefix("include") else {
            return false;
        };
        let Some(rest) = rest.trim_start().strip_prefix('"') else {
            return false;
        };
        rest.trim_start_matches('.').starts_with('/')
    })
}

fuzz_target!(|data: &[u8]| {
    let Ok(sketch) = std::str::from_utf8(data) else {
        return;
    };
    assert_eq!(
        waca_core::validate_sketch(sketch).is_err(),
        has_relative_include(sketch),
        "validator disagrees on {sketch:?}"
    );
});
