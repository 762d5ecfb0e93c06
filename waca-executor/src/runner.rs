//! Compile runner: one sketch in, one flashable image (or diagnostics) out.
//!
//! For each request the runner:
//! 1. Screens the sketch for relative quote includes
//! 2. Allocates a [`Workspace`]
//! 3. Writes the sketch, optionally copies auxiliary files, creates `compiled/`
//! 4. Runs the toolchain with a bounded timeout
//! 5. Sanitizes stdout and stderr
//! 6. Reads and encodes the artifact
//!
//! Steps 3 to 6 run while the runner owns the workspace, and the workspace is
//! released before [`CompileRunner::compile`] returns on every path.

use std::path::Path;
use std::time::Instant;

use waca_core::{
    validate_sketch, CompileRequest, SanitizationMap, MAIN_SKETCH_FILE, SKETCH_FOLDER,
};

use crate::artifact::{artifact_file_name, read_artifact};
use crate::backend::{CompileInvocation, Toolchain, ToolchainDirs};
use crate::config::CompileSettings;
use crate::sketch::{copy_auxiliary_files, sketch_file_name, write_sketch};
use crate::workspace::Workspace;
use crate::ExecutorError;

/// Result of a compile that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileOutcome {
    /// The toolchain succeeded and produced an image.
    Success {
        /// Base64-encoded image.
        artifact: String,
        stdout: String,
        stderr: String,
    },
    /// The toolchain ran and reported a compile error.
    Failed { stdout: String, stderr: String },
}

impl CompileOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Drives a [`Toolchain`] through the full per-request workspace lifecycle.
///
/// # Cancel Safety
/// Cancel safe. Dropping the future removes the workspace through its
/// `Drop` and kills the toolchain process via `kill_on_drop`.
pub struct CompileRunner<T: Toolchain> {
    toolchain: T,
    settings: CompileSettings,
    /// Toolchain directories, already registered.
    base_sanitization: SanitizationMap,
}

impl<T: Toolchain> CompileRunner<T> {
    /// Create a runner.
    ///
    /// # Errors
    /// Returns [`ExecutorError::Sanitize`] if a toolchain directory cannot be
    /// used as a sanitization key.
    pub fn new(toolchain: T, settings: CompileSettings, dirs: &ToolchainDirs) -> Result<Self, ExecutorError> {
        let mut base_sanitization = SanitizationMap::new();
        dirs.register(&mut base_sanitization)?;
        Ok(Self { toolchain, settings, base_sanitization })
    }

    #[must_use]
    pub fn toolchain(&self) -> &T {
        &self.toolchain
    }

    #[must_use]
    pub fn settings(&self) -> &CompileSettings {
        &self.settings
    }

    /// Compile one sketch.
    ///
    /// A compiler-reported failure is `Ok(CompileOutcome::Failed)`.
    ///
    /// # Errors
    /// Returns [`ExecutorError::Rejected`] before allocating anything if the
    /// sketch fails validation. Every other variant is an infrastructure
    /// fault; the workspace has been released by the time it is returned.
    pub async fn compile(&self, request: &CompileRequest) -> Result<CompileOutcome, ExecutorError> {
        validate_sketch(&request.sketch)?;

        let workspace = Workspace::acquire(self.settings.temp_root.as_deref())
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "failed to create a workspace"))?;

        let started = Instant::now();
        let result = self.compile_in(&workspace, request).await;

        match &result {
            Ok(outcome) => tracing::info!(
                board = %request.board,
                success = outcome.is_success(),
                elapsed_ms = started.elapsed().as_millis(),
                "compile finished"
            ),
            // Only reachable through outside interference with the workspace.
            Err(e @ ExecutorError::ArtifactMissing { .. }) => {
                tracing::info!(board = %request.board, error = %e, "compile produced no artifact");
            }
            Err(e) => tracing::warn!(board = %request.board, error = %e, "compile aborted"),
        }

        if let Err(e) = workspace.release().await {
            tracing::warn!(error = %e, "failed to remove a workspace");
        }
        result
    }

    async fn compile_in(
        &self,
        workspace: &Workspace,
        request: &CompileRequest,
    ) -> Result<CompileOutcome, ExecutorError> {
        let sketch_path = write_sketch(workspace, &request.sketch).await?;
        let sanitizer = self.sanitization_for(workspace, &sketch_path)?;

        let auxiliary = &self.settings.auxiliary;
        if request.include_lcd_deps && request.board.in_family(&auxiliary.board_prefix) {
            let copied = copy_auxiliary_files(&auxiliary.source_dir, workspace.path()).await?;
            tracing::debug!(copied, "auxiliary files copied");
        }

        let output_dir = workspace.make_output_dir().await?;

        let invocation = CompileInvocation {
            board: &request.board,
            verbose: request.verbose,
            warnings: request.warnings,
            output_dir: &output_dir,
            sketch_path: &sketch_path,
            workspace: workspace.path(),
        };
        let output = self.toolchain.compile(&invocation, self.settings.timeout).await?;

        let stdout = sanitizer.apply(&output.stdout);
        let stderr = sanitizer.apply(&output.stderr);

        if !output.success {
            tracing::debug!(exit_code = ?output.exit_code, "compiler reported failure");
            return Ok(CompileOutcome::Failed { stdout, stderr });
        }

        let file_name = artifact_file_name(&sketch_file_name(workspace.name()), &request.board);
        let artifact = read_artifact(&output_dir, &file_name).await?;

        Ok(CompileOutcome::Success { artifact, stdout, stderr })
    }

    fn sanitization_for(
        &self,
        workspace: &Workspace,
        sketch_path: &Path,
    ) -> Result<SanitizationMap, ExecutorError> {
        let mut map = self.base_sanitization.clone();
        map.insert_path(sketch_path, MAIN_SKETCH_FILE)?;
        map.insert_path(workspace.path(), SKETCH_FOLDER)?;
        map.insert_path(workspace.raw_path(), SKETCH_FOLDER)?;
        Ok(map)
    }
}
