//! Normalized compile request and its lenient JSON decoding.

use serde_json::Value;

use crate::board::Board;
use crate::error::ValidationError;
use crate::warnings::WarningLevel;

/// A compile request after defaults have been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct CompileRequest {
    /// Target board; defaults to [`DEFAULT_BOARD`](crate::board::DEFAULT_BOARD).
    pub board: Board,
    /// Sketch source. An empty string is a valid (empty) program.
    pub sketch: String,
    /// Pass `-v` to the toolchain.
    pub verbose: bool,
    /// Warning level for the compiler.
    pub warnings: WarningLevel,
    /// Copy the auxiliary LCD support files into the workspace when the board
    /// is in the configured family.
    pub include_lcd_deps: bool,
}

impl CompileRequest {
    #[must_use]
    pub fn new(board: Board, sketch: impl Into<String>) -> Self {
        Self {
            board,
            sketch: sketch.into(),
            verbose: false,
            warnings: WarningLevel::default(),
            include_lcd_deps: false,
        }
    }

    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    #[must_use]
    pub fn with_warnings(mut self, warnings: WarningLevel) -> Self {
        self.warnings = warnings;
        self
    }

    #[must_use]
    pub fn with_lcd_deps(mut self, include: bool) -> Self {
        self.include_lcd_deps = include;
        self
    }

    /// Decode a `POST /compile` JSON body.
    ///
    /// - `board`: any non-string (or missing) value falls back to the default board.
    /// - `sketch`: missing or `null` is an empty program; other non-strings are rejected.
    /// - `verbose`: enabled by the string `"true"` or the boolean `true`.
    /// - `warnings`: missing or `null` is `default`; otherwise must name a level.
    ///
    /// # Errors
    /// Returns [`ValidationError`] when the body is not an object, `sketch` or
    /// `warnings` has the wrong type, or `warnings` names an unknown level.
    pub fn from_json(body: &Value, include_lcd_deps: bool) -> Result<Self, ValidationError> {
        let fields = body.as_object().ok_or(ValidationError::NotAnObject)?;

        let board = match fields.get("board") {
            Some(Value::String(fqbn)) => Board::new(fqbn.as_str()),
            _ => Board::default(),
        };

        let sketch = match fields.get("sketch") {
            Some(Value::String(source)) => source.clone(),
            None | Some(Value::Null) => String::new(),
            Some(_) => {
                return Err(ValidationError::InvalidField { field: "sketch", expected: "a string" });
            }
        };

        let verbose = matches!(fields.get("verbose"), Some(Value::Bool(true)))
            || fields.get("verbose").and_then(Value::as_str) == Some("true");

        let warnings = match fields.get("warnings") {
            None | Some(Value::Null) => WarningLevel::default(),
            Some(Value::String(level)) => level.parse()?,
            Some(_) => {
                return Err(ValidationError::InvalidField {
                    field: "warnings",
                    expected: "one of none, default, more, all",
                });
            }
        };

        Ok(Self { board, sketch, verbose, warnings, include_lcd_deps })
    }
}

/// Interpret the `include_lcd_deps` query value.
///
/// Present and non-empty enables injection, except for the literal values
/// `0` and `false`.
#[must_use]
pub fn query_flag(value: Option<&str>) -> bool {
    matches!(value, Some(v) if !v.is_empty() && v != "0" && !v.eq_ignore_ascii_case("false"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn decode(body: &Value) -> CompileRequest {
        match CompileRequest::from_json(body, false) {
            Ok(r) => r,
            Err(e) => panic!("decode failed: {e}"),
        }
    }

    #[test]
    fn missing_board_uses_default() {
        let req = decode(&json!({"sketch": "void setup(){}"}));
        assert_eq!(req.board.as_str(), "arduino:avr:uno");
    }

    #[test]
    fn non_string_board_uses_default() {
        let req = decode(&json!({"sketch": "", "board": 42}));
        assert_eq!(req.board, Board::default());
    }

    #[test]
    fn missing_sketch_is_empty_program() {
        let req = decode(&json!({}));
        assert_eq!(req.sketch, "");
        let req = decode(&json!({"sketch": null}));
        assert_eq!(req.sketch, "");
    }

    #[test]
    fn non_string_sketch_is_rejected() {
        let err = CompileRequest::from_json(&json!({"sketch": ["a"]}), false);
        assert_eq!(
            err,
            Err(ValidationError::InvalidField { field: "sketch", expected: "a string" })
        );
    }

    #[test]
    fn verbose_accepts_string_true_and_bool_true_only() {
        assert!(decode(&json!({"verbose": "true"})).verbose);
        assert!(decode(&json!({"verbose": true})).verbose);
        assert!(!decode(&json!({"verbose": "yes"})).verbose);
        assert!(!decode(&json!({"verbose": "false"})).verbose);
        assert!(!decode(&json!({})).verbose);
    }

    #[test]
    fn warnings_default_and_explicit() {
        assert_eq!(decode(&json!({})).warnings, WarningLevel::Default);
        assert_eq!(decode(&json!({"warnings": "all"})).warnings, WarningLevel::All);
    }

    #[test]
    fn invalid_warnings_are_rejected() {
        assert!(matches!(
            CompileRequest::from_json(&json!({"warnings": "extreme"}), false),
            Err(ValidationError::InvalidWarningLevel { .. })
        ));
        assert!(matches!(
            CompileRequest::from_json(&json!({"warnings": 3}), false),
            Err(ValidationError::InvalidField { field: "warnings", .. })
        ));
    }

    #[test]
    fn non_object_body_is_rejected() {
        assert_eq!(
            CompileRequest::from_json(&json!("sketch"), false),
            Err(ValidationError::NotAnObject)
        );
    }

    #[test]
    fn query_flag_truthiness() {
        assert!(query_flag(Some("1")));
        assert!(query_flag(Some("true")));
        assert!(query_flag(Some("yes")));
        assert!(!query_flag(Some("")));
        assert!(!query_flag(Some("0")));
        assert!(!query_flag(Some("False")));
        assert!(!query_flag(None));
    }
}
