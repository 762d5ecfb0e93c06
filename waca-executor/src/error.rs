//! Error types for the executor crate.

use std::io;

use waca_core::{SanitizeError, ValidationError};

/// Errors that can occur while orchestrating a compile or querying the toolchain.
///
/// A compiler that runs and reports failure is not an error; see
/// [`CompileOutcome::Failed`](crate::CompileOutcome::Failed).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ExecutorError {
    /// The request was rejected before any resource was allocated.
    #[error(transparent)]
    Rejected(#[from] ValidationError),

    /// The per-request temporary directory could not be created.
    #[error("workspace allocation failed: {0}")]
    WorkspaceAllocation(#[source] io::Error),

    /// The sketch source could not be written into the workspace.
    #[error("failed to write sketch: {0}")]
    SketchWrite(#[source] io::Error),

    /// Copying the auxiliary support files failed.
    #[error("failed to copy auxiliary files: {0}")]
    AuxiliaryCopy(#[source] io::Error),

    /// The `compiled` output directory could not be created.
    #[error("failed to create output directory: {0}")]
    OutputDir(#[source] io::Error),

    /// The toolchain process could not be started at all.
    #[error("failed to launch toolchain: {0}")]
    Launch(String),

    /// The toolchain did not finish within the configured bound.
    #[error("toolchain did not complete within {secs}s")]
    Timeout { secs: u64 },

    /// The toolchain reported success but left no artifact behind.
    #[error("expected artifact {file_name} was not produced")]
    ArtifactMissing { file_name: String },

    /// The artifact exists but could not be read.
    #[error("failed to read artifact: {0}")]
    ArtifactRead(#[source] io::Error),

    /// A path could not be registered with the output sanitizer.
    #[error("cannot sanitize output: {0}")]
    Sanitize(#[from] SanitizeError),

    /// A non-compile toolchain query (version, config, boards, libraries) failed.
    #[error("toolchain query failed: {0}")]
    ToolchainQuery(String),

    /// Removing the workspace failed.
    #[error("workspace release failed: {0}")]
    Release(#[source] io::Error),
}
