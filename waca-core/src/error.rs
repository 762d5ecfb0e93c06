/// Rejections of user-supplied compile input.
///
/// These are always the caller's fault and map to a 400-class response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ValidationError {
    /// The sketch contains an `#include "./..."` or `#include "../..."` directive.
    #[error(
        "relative quote imports are not allowed, omit ./ in front of quote import directives\n\
         for example, #include \"./foo.h\" should be #include \"foo.h\""
    )]
    RelativeInclude,

    /// The `warnings` field is not one of `none`, `default`, `more`, `all`.
    #[error("invalid warning level '{value}': expected one of none, default, more, all")]
    InvalidWarningLevel { value: String },

    /// A request field has the wrong JSON type.
    #[error("invalid field '{field}': expected {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    /// The request body is not a JSON object.
    #[error("request body must be a JSON object")]
    NotAnObject,
}

/// Errors building a [`SanitizationMap`](crate::sanitize::SanitizationMap).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum SanitizeError {
    /// Keys must be non-empty.
    #[error("sanitization key must not be empty")]
    EmptyKey,

    /// Keys must contain a path separator so they can never occur inside a
    /// placeholder.
    #[error("sanitization key '{key}' is not a filesystem path")]
    NotAPath { key: String },

    /// Keys may not contain placeholder delimiters, otherwise a substitution
    /// could produce a fresh occurrence of some key.
    #[error("sanitization key '{key}' contains a placeholder delimiter")]
    DelimiterInKey { key: String },
}
