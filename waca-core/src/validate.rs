//! Textual screening of sketch source before any resource is allocated.
//!
//! A quoted include whose path starts with `./`, `../` (or any run of dots
//! followed by a slash, including a bare `/`) would let a sketch pull files
//! from outside its workspace, and the toolchain would echo their contents or
//! locations back in diagnostics.
//!
//! The scan is purely textual. A matching directive inside a string literal
//! or a comment is rejected too; that false positive is accepted.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ValidationError;

#[expect(clippy::expect_used, reason = "pattern is a compile-time constant")]
static RELATIVE_QUOTE_INCLUDE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"#\s*include\s*"\.*/"#).expect("relative include pattern must compile")
});

/// Reject sketches containing relative quote-style include directives.
///
/// # Errors
/// Returns [`ValidationError::RelativeInclude`] on the first match.
pub fn validate_sketch(sketch: &str) -> Result<(), ValidationError> {
    if RELATIVE_QUOTE_INCLUDE.is_match(sketch) {
        return Err(ValidationError::RelativeInclude);
    }
    Ok(())
}
