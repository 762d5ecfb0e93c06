//! Fuzz target: path sanitization.
//!
//! No registered path may survive `apply`, and applying twice must be a no-op.
#![no_main]

use libfuzzer_sys::fuzz_target;
use waca_core::{SanitizationMap, LIBRARIES_FOLDER, MAIN_SKETCH_FILE, SKETCH_FOLDER};

const SKETCH_DIR: &str = "/tmp/waca-sketchAbC123";
const SKETCH_PATH: &str = "/tmp/waca-sketchAbC123/waca-sketchAbC123.ino";
const USER_DIR: &str = "/home/waca/Arduino";

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let mut map = SanitizationMap::new();
    for (key, placeholder) in [
        (USER_DIR, LIBRARIES_FOLDER),
        (SKETCH_PATH, MAIN_SKETCH_FILE),
        (SKETCH_DIR, SKETCH_FOLDER),
    ] {
        if let Err(e) = map.insert(key, placeholder) {
            panic!("fixed key rejected: {e}");
        }
    }

    let clean = map.apply(text);
    for key in map.keys() {
        assert!(!clean.contains(key), "{key} survived in {clean:?}");
    }
    assert_eq!(map.apply(&clean), clean);
});
