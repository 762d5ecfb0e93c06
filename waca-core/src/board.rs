//! Board identifiers and the family rules keyed on them.

use std::fmt;

/// Board used when a request does not name one.
pub const DEFAULT_BOARD: &str = "arduino:avr:uno";

/// Boards in this family emit a raw `.bin` image instead of Intel HEX.
const BIN_FAMILY_PREFIX: &str = "esp8266:esp8266:";

/// A toolchain-specific fully qualified board name, e.g. `arduino:avr:uno`.
///
/// The value is free-form: the toolchain is the authority on which boards
/// exist, so no structural validation happens here.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board(String);

impl Board {
    #[must_use]
    pub fn new(fqbn: impl Into<String>) -> Self {
        Self(fqbn.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// ASCII case-insensitive prefix match against a board family.
    #[must_use]
    pub fn in_family(&self, prefix: &str) -> bool {
        self.0
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    }

    /// File extension of the flashable image the toolchain writes for this board.
    #[must_use]
    pub fn artifact_extension(&self) -> &'static str {
        if self.0.starts_with(BIN_FAMILY_PREFIX) {
            "bin"
        } else {
            "hex"
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(DEFAULT_BOARD)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
