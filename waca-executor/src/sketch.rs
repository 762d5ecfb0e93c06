//! Writing the submitted sketch and auxiliary files into a workspace.

use std::path::{Path, PathBuf};

use crate::workspace::Workspace;
use crate::ExecutorError;

/// Extension the toolchain expects on a sketch's main file.
pub const SKETCH_EXTENSION: &str = "ino";

/// Main sketch file name for a workspace.
///
/// The toolchain requires the main file to share its folder's base name, so
/// this is the workspace's own leaf name plus [`SKETCH_EXTENSION`].
#[must_use]
pub fn sketch_file_name(workspace_name: &str) -> String {
    format!("{workspace_name}.{SKETCH_EXTENSION}")
}

/// Write `source` as the workspace's main sketch file and return its absolute path.
///
/// # Errors
/// Returns [`ExecutorError::SketchWrite`] on any I/O failure.
pub async fn write_sketch(workspace: &Workspace, source: &str) -> Result<PathBuf, ExecutorError> {
    let path = workspace.path().join(sketch_file_name(workspace.name()));
    tokio::fs::write(&path, source)
        .await
        .map_err(ExecutorError::SketchWrite)?;
    Ok(path)
}

/// Copy every regular file directly inside `source_dir` into `dest`.
///
/// Subdirectories and other non-regular entries are skipped. Returns the
/// number of files copied.
///
/// # Errors
/// Returns [`ExecutorError::AuxiliaryCopy`] if the directory cannot be read
/// or any file fails to copy.
pub async fn copy_auxiliary_files(source_dir: &Path, dest: &Path) -> Result<usize, ExecutorError> {
    let mut entries = tokio::fs::read_dir(source_dir)
        .await
        .map_err(ExecutorError::AuxiliaryCopy)?;

    let mut copied = 0usize;
    while let Some(entry) = entries.next_entry().await.map_err(ExecutorError::AuxiliaryCopy)? {
        let file_type = entry.file_type().await.map_err(ExecutorError::AuxiliaryCopy)?;
        if !file_type.is_file() {
            continue;
        }
        tokio::fs::copy(entry.path(), dest.join(entry.file_name()))
            .await
            .map_err(ExecutorError::AuxiliaryCopy)?;
        copied += 1;
    }
    Ok(copied)
}
