//! Toolchain backend abstraction trait.
//!
//! Allows swapping the real `arduino-cli` for a stand-in without changing
//! the compile orchestration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use waca_core::{Board, SanitizationMap, SanitizeError, WarningLevel, LIBRARIES_FOLDER};

use crate::ExecutorError;

/// Everything the toolchain needs for one compile.
#[derive(Debug, Clone, Copy)]
pub struct CompileInvocation<'a> {
    pub board: &'a Board,
    pub verbose: bool,
    pub warnings: WarningLevel,
    /// Directory the artifact is written to.
    pub output_dir: &'a Path,
    /// Absolute path of the main sketch file.
    pub sketch_path: &'a Path,
    /// Working directory of the toolchain process.
    pub workspace: &'a Path,
}

/// Captured result of a finished toolchain process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `true` if the process exited with status zero.
    pub success: bool,
    /// Exit code, `None` if the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Toolchain-internal directories whose absolute paths must never reach a client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct ToolchainDirs {
    /// Cores, tools and platform data.
    pub data: Option<PathBuf>,
    /// Sketchbook and user-installed libraries.
    pub user: Option<PathBuf>,
    /// Download staging area.
    pub downloads: Option<PathBuf>,
}

impl ToolchainDirs {
    #[must_use]
    pub fn new(data: Option<PathBuf>, user: Option<PathBuf>, downloads: Option<PathBuf>) -> Self {
        Self { data, user, downloads }
    }

    /// Present directories in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        [&self.data, &self.user, &self.downloads]
            .into_iter()
            .filter_map(|dir| dir.as_deref())
    }

    /// Register every directory with the sanitizer.
    ///
    /// # Errors
    /// Returns [`SanitizeError`] if a directory path is not an acceptable key.
    pub fn register(&self, map: &mut SanitizationMap) -> Result<(), SanitizeError> {
        for dir in self.iter() {
            map.insert_path(dir, LIBRARIES_FOLDER)?;
        }
        Ok(())
    }
}

/// External build toolchain.
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Cancel Safety
/// All methods are cancel safe. Dropping a future kills any child process
/// it spawned.
#[async_trait]
pub trait Toolchain: Send + Sync {
    /// Report the toolchain version. Used as the startup probe.
    ///
    /// # Errors
    /// Returns [`ExecutorError::Launch`] or [`ExecutorError::ToolchainQuery`]
    /// if the toolchain is unreachable.
    async fn version(&self) -> Result<String, ExecutorError>;

    /// Resolve the toolchain's internal directories.
    ///
    /// # Errors
    /// Returns [`ExecutorError::ToolchainQuery`] if the configuration cannot be read.
    async fn directories(&self) -> Result<ToolchainDirs, ExecutorError>;

    /// List every installable board as a JSON array.
    ///
    /// # Errors
    /// Returns [`ExecutorError::ToolchainQuery`] on a failed or malformed query.
    async fn board_list(&self) -> Result<Value, ExecutorError>;

    /// List installed libraries as a JSON array, without filesystem locations.
    ///
    /// # Errors
    /// Returns [`ExecutorError::ToolchainQuery`] on a failed or malformed query.
    async fn library_list(&self) -> Result<Value, ExecutorError>;

    /// Compile one sketch.
    ///
    /// A failed compilation is `Ok` with `success == false`.
    ///
    /// # Errors
    /// Returns [`ExecutorError::Launch`] if the process cannot be started and
    /// [`ExecutorError::Timeout`] if it outlives `timeout`.
    async fn compile(
        &self,
        invocation: &CompileInvocation<'_>,
        timeout: Duration,
    ) -> Result<ProcessOutput, ExecutorError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toolchain_dirs_iter_skips_missing() {
        let dirs = ToolchainDirs::new(Some(PathBuf::from("/opt/data")), None, Some(PathBuf::from("/opt/dl")));
        let seen: Vec<&Path> = dirs.iter().collect();
        assert_eq!(seen, [Path::new("/opt/data"), Path::new("/opt/dl")]);
    }

    #[test]
    fn toolchain_dirs_register_masks_each_dir() {
        let dirs = ToolchainDirs::new(
            Some(PathBuf::from("/home/u/.arduino15")),
            Some(PathBuf::from("/home/u/Arduino")),
            None,
        );
        let mut map = SanitizationMap::new();
        if let Err(e) = dirs.register(&mut map) {
            panic!("register failed: {e}");
        }
        let out = map.apply("/home/u/Arduino/libraries/Servo and /home/u/.arduino15/packages");
        assert_eq!(out, "<libraries folder>/libraries/Servo and <libraries folder>/packages");
    }
}
