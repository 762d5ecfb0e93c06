//! Per-request build orchestration for the waca compilation service.
//!
//! Owns every side effect of a compile: the disposable workspace, writing
//! the sketch, running the toolchain as a bounded child process, and reading
//! the artifact back.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod arduino_cli;
pub mod artifact;
pub mod backend;
pub mod config;
pub mod error;
pub mod runner;
pub mod shell;
pub mod sketch;
pub mod workspace;

pub use arduino_cli::ArduinoCli;
pub use backend::{CompileInvocation, ProcessOutput, Toolchain, ToolchainDirs};
pub use config::{AuxiliaryFiles, CompileSettings};
pub use error::ExecutorError;
pub use runner::{CompileOutcome, CompileRunner};
pub use workspace::{Workspace, OUTPUT_SUBDIR, WORKSPACE_PREFIX};
