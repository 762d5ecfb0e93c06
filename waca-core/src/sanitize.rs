//! Removal of absolute filesystem paths from toolchain output.
//!
//! # Priority
//! Keys are applied longest first. Ties keep insertion order. A toolchain
//! directory nested inside the workspace (or the sketch file inside it) is
//! therefore masked before the coarser workspace key can split it.
//!
//! # Termination
//! Every placeholder starts with `<`, ends with `>` and holds no path
//! separator. Every key holds a separator and neither delimiter (enforced by
//! [`SanitizationMap::insert`]). An occurrence of a key overlapping an
//! inserted placeholder would have to lie inside it, which needs a separator
//! in the placeholder, or cross one of its delimiters. So a replacement never
//! creates a new occurrence of any key. Each exhaustive loop finishes after
//! one productive pass and sanitizing sanitized text is a no-op.

use std::path::Path;

use crate::error::SanitizeError;

/// Replaces the sketch file path.
pub const MAIN_SKETCH_FILE: &str = "<main sketch file>";
/// Replaces the workspace directory path.
pub const SKETCH_FOLDER: &str = "<sketch folder>";
/// Replaces toolchain data, user and download directories.
pub const LIBRARIES_FOLDER: &str = "<libraries folder>";

const OPEN: char = '<';
const CLOSE: char = '>';
const SEPARATORS: [char; 2] = ['/', '\\'];

/// Ordered `(sensitive literal, placeholder)` pairs for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SanitizationMap {
    entries: Vec<(String, &'static str)>,
}

impl SanitizationMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key, keeping the list sorted longest key first.
    ///
    /// A key that is already present is ignored; the first placeholder wins.
    ///
    /// # Errors
    /// Returns [`SanitizeError::EmptyKey`], [`SanitizeError::NotAPath`] or
    /// [`SanitizeError::DelimiterInKey`] if the key would break the
    /// termination argument in the module docs.
    pub fn insert(&mut self, key: impl Into<String>, placeholder: &'static str) -> Result<(), SanitizeError> {
        let key = key.into();
        if key.is_empty() {
            return Err(SanitizeError::EmptyKey);
        }
        if !key.contains(SEPARATORS) {
            return Err(SanitizeError::NotAPath { key });
        }
        if key.contains(OPEN) || key.contains(CLOSE) {
            return Err(SanitizeError::DelimiterInKey { key });
        }
        debug_assert!(placeholder.starts_with(OPEN) && placeholder.ends_with(CLOSE));
        debug_assert!(!placeholder.contains(SEPARATORS));
        if self.entries.iter().any(|(existing, _)| *existing == key) {
            return Ok(());
        }
        let at = self
            .entries
            .iter()
            .position(|(existing, _)| existing.len() < key.len())
            .unwrap_or(self.entries.len());
        self.entries.insert(at, (key, placeholder));
        Ok(())
    }

    /// Add a filesystem path as a key. Non-UTF-8 paths are added lossily,
    /// which matches how captured output is decoded.
    ///
    /// # Errors
    /// See [`SanitizationMap::insert`].
    pub fn insert_path(&mut self, path: &Path, placeholder: &'static str) -> Result<(), SanitizeError> {
        self.insert(path.to_string_lossy().into_owned(), placeholder)
    }

    /// Keys in application order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace every occurrence of every key.
    #[must_use]
    pub fn apply(&self, text: &str) -> String {
        let mut out = text.to_owned();
        for (key, placeholder) in &self.entries {
            while out.contains(key.as_str()) {
                out = out.replace(key.as_str(), placeholder);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &'static str)]) -> SanitizationMap {
        let mut m = SanitizationMap::new();
        for (key, placeholder) in pairs {
            if let Err(e) = m.insert(*key, *placeholder) {
                panic!("insert {key}: {e}");
            }
        }
        m
    }

    #[test]
    fn apply_replaces_every_occurrence() {
        let m = map(&[("/tmp/waca-sketchX", SKETCH_FOLDER)]);
        let out = m.apply("/tmp/waca-sketchX/a.o and /tmp/waca-sketchX/b.o");
        assert_eq!(out, "<sketch folder>/a.o and <sketch folder>/b.o");
    }

    #[test]
    fn longer_keys_are_applied_first_regardless_of_insert_order() {
        let m = map(&[
            ("/tmp/ws", SKETCH_FOLDER),
            ("/tmp/ws/ws.ino", MAIN_SKETCH_FILE),
            ("/tmp/ws/.arduino15", LIBRARIES_FOLDER),
        ]);
        let keys: Vec<&str> = m.keys().collect();
        assert_eq!(keys, ["/tmp/ws/.arduino15", "/tmp/ws/ws.ino", "/tmp/ws"]);

        let out = m.apply("/tmp/ws/ws.ino:3: in /tmp/ws/.arduino15/x.h from /tmp/ws");
        assert_eq!(out, "<main sketch file>:3: in <libraries folder>/x.h from <sketch folder>");
    }

    #[test]
    fn equal_length_keys_keep_insert_order() {
        let m = map(&[("/aa", SKETCH_FOLDER), ("/bb", LIBRARIES_FOLDER)]);
        let keys: Vec<&str> = m.keys().collect();
        assert_eq!(keys, ["/aa", "/bb"]);
    }

    #[test]
    fn duplicate_key_keeps_first_placeholder() {
        let m = map(&[("/same", LIBRARIES_FOLDER), ("/same", SKETCH_FOLDER)]);
        assert_eq!(m.len(), 1);
        assert_eq!(m.apply("/same"), LIBRARIES_FOLDER);
    }

    #[test]
    fn insert_rejects_empty_and_delimited_keys() {
        let mut m = SanitizationMap::new();
        assert_eq!(m.insert("", SKETCH_FOLDER), Err(SanitizeError::EmptyKey));
        assert!(matches!(
            m.insert("/tmp/<x>", SKETCH_FOLDER),
            Err(SanitizeError::DelimiterInKey { .. })
        ));
        assert!(matches!(
            m.insert("sketch", SKETCH_FOLDER),
            Err(SanitizeError::NotAPath { .. })
        ));
        assert!(m.is_empty());
    }

    #[test]
    fn empty_map_is_identity() {
        assert_eq!(SanitizationMap::new().apply("unchanged /tmp"), "unchanged /tmp");
    }

    #[test]
    fn adjacent_occurrences_are_all_removed() {
        let m = map(&[("/x/x", SKETCH_FOLDER)]);
        let out = m.apply("/x/x/x/x/x");
        assert!(!out.contains("/x/x"), "leftover key in {out}");
    }

    proptest::proptest! {
        #[test]
        fn proptest_keys_never_survive_and_resanitizing_is_noop(
            ws in "/[a-z]{1,6}(/[a-zA-Z0-9._-]{1,8}){0,3}",
            lib in "/[a-z]{1,6}(/[a-zA-Z0-9._-]{1,8}){0,3}",
            chunks in proptest::collection::vec(0u8..4, 0..24),
        ) {
            let sketch = format!("{ws}/s.ino");
            let mut m = SanitizationMap::new();
            proptest::prop_assert!(m.insert(sketch.clone(), MAIN_SKETCH_FILE).is_ok());
            proptest::prop_assert!(m.insert(ws.clone(), SKETCH_FOLDER).is_ok());
            proptest::prop_assert!(m.insert(lib.clone(), LIBRARIES_FOLDER).is_ok());

            let text: String = chunks
                .iter()
                .map(|c| match c {
                    0 => sketch.as_str(),
                    1 => ws.as_str(),
                    2 => lib.as_str(),
                    _ => " error: x ",
                })
                .collect();

            let once = m.apply(&text);
            for key in m.keys() {
                proptest::prop_assert!(!once.contains(key), "key {} survived in {}", key, once);
            }
            proptest::prop_assert_eq!(m.apply(&once), once);
        }
    }
}
