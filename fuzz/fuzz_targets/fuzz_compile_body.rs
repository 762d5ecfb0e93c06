//! Fuzz target: `CompileRequest::from_json` on arbitrary JSON bodies.
//!
//! Malformed bodies must be rejected with an error, never a panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use waca_core::CompileRequest;

fuzz_target!(|data: &[u8]| {
    let Ok(body) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    for lcd in [false, true] {
        if let Ok(request) = CompileRequest::from_json(&body, lcd) {
            assert_eq!(request.include_lcd_deps, lcd);
            match body.get("board").and_then(serde_json::Value::as_str) {
                Some(fqbn) => assert_eq!(request.board.as_str(), fqbn),
                None => assert_eq!(request.board.as_str(), waca_core::DEFAULT_BOARD),
            }
        }
    }
});
