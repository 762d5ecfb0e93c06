//! Core types for the waca sketch compilation service.
//!
//! Everything here is pure: request decoding, the relative-include screen,
//! board-family rules and the output sanitizer. Filesystem and process work
//! lives in `waca-executor`.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod board;
pub mod error;
pub mod request;
pub mod sanitize;
pub mod validate;
pub mod warnings;

pub use board::{Board, DEFAULT_BOARD};
pub use error::{SanitizeError, ValidationError};
pub use request::{query_flag, CompileRequest};
pub use sanitize::{SanitizationMap, LIBRARIES_FOLDER, MAIN_SKETCH_FILE, SKETCH_FOLDER};
pub use validate::validate_sketch;
pub use warnings::WarningLevel;
