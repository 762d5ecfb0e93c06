//! Per-request disposable workspace.
//!
//! Each compile gets a freshly created directory under the temp root. The
//! name comes from `tempfile`'s exclusive-create retry loop, so concurrent
//! requests never share a directory and need no locking.

use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::ExecutorError;

/// Prefix of every workspace directory name, for external auditing and cleanup.
pub const WORKSPACE_PREFIX: &str = "waca-sketch";

/// Name of the subdirectory the toolchain writes artifacts into.
pub const OUTPUT_SUBDIR: &str = "compiled";

/// An exclusively owned temporary directory.
///
/// [`Workspace::release`] consumes the handle, so the tree is removed at most
/// once. A handle dropped without release (panic, or the owning future being
/// cancelled) still removes the tree through [`TempDir`]'s `Drop`.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
    /// Canonical form of `dir.path()`.
    path: PathBuf,
    /// Final path component, e.g. `waca-sketchR4nd0m`.
    name: String,
}

impl Workspace {
    /// Create a new workspace under `root`, or the system temp dir if `None`.
    ///
    /// Nothing is left on disk if this fails.
    ///
    /// # Errors
    /// Returns [`ExecutorError::WorkspaceAllocation`] if the directory cannot
    /// be created or resolved.
    pub async fn acquire(root: Option<&Path>) -> Result<Self, ExecutorError> {
        let root = root.map(Path::to_path_buf);
        let (dir, path) = tokio::task::spawn_blocking(move || -> io::Result<(TempDir, PathBuf)> {
            let mut builder = tempfile::Builder::new();
            builder.prefix(WORKSPACE_PREFIX);
            let dir = match root {
                Some(root) => builder.tempdir_in(root)?,
                None => builder.tempdir()?,
            };
            let path = dir.path().canonicalize()?;
            Ok((dir, path))
        })
        .await
        .map_err(|e| ExecutorError::WorkspaceAllocation(io::Error::other(e)))?
        .map_err(ExecutorError::WorkspaceAllocation)?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                ExecutorError::WorkspaceAllocation(io::Error::other("workspace path has no final component"))
            })?;

        tracing::debug!(workspace = %path.display(), "workspace allocated");

        Ok(Self { dir, path, name })
    }

    /// Canonical absolute path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path as created, before canonicalization. Equal to [`Workspace::path`]
    /// unless the temp root sits behind a symlink.
    #[must_use]
    pub fn raw_path(&self) -> &Path {
        self.dir.path()
    }

    /// Leaf directory name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Create the [`OUTPUT_SUBDIR`] directory and return its path.
    ///
    /// # Errors
    /// Returns [`ExecutorError::OutputDir`] if it cannot be created (including
    /// when it already exists).
    pub async fn make_output_dir(&self) -> Result<PathBuf, ExecutorError> {
        let out = self.path.join(OUTPUT_SUBDIR);
        tokio::fs::create_dir(&out)
            .await
            .map_err(ExecutorError::OutputDir)?;
        Ok(out)
    }

    /// Remove the workspace and everything in it.
    ///
    /// # Errors
    /// Returns [`ExecutorError::Release`] if removal fails.
    pub async fn release(self) -> Result<(), ExecutorError> {
        let Self { dir, path, .. } = self;
        tokio::task::spawn_blocking(move || dir.close())
            .await
            .map_err(|e| ExecutorError::Release(io::Error::other(e)))?
            .map_err(ExecutorError::Release)?;
        tracing::debug!(workspace = %path.display(), "workspace released");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn acquire_in(root: &Path) -> Workspace {
        match Workspace::acquire(Some(root)).await {
            Ok(ws) => ws,
            Err(e) => panic!("acquire failed: {e}"),
        }
    }

    fn scratch() -> TempDir {
        match tempfile::tempdir() {
            Ok(d) => d,
            Err(e) => panic!("tempdir: {e}"),
        }
    }

    #[tokio::test]
    async fn acquire_creates_prefixed_directory() {
        let root = scratch();
        let ws = acquire_in(root.path()).await;
        assert!(ws.path().is_dir(), "workspace must exist after acquire");
        assert!(ws.name().starts_with(WORKSPACE_PREFIX), "name {} lacks prefix", ws.name());
        assert!(ws.path().is_absolute());
        assert_eq!(ws.path().file_name().map(|n| n.to_string_lossy().into_owned()).as_deref(), Some(ws.name()));
    }

    #[tokio::test]
    async fn release_removes_tree_with_contents() {
        let root = scratch();
        let ws = acquire_in(root.path()).await;
        let out = match ws.make_output_dir().await {
            Ok(p) => p,
            Err(e) => panic!("make_output_dir: {e}"),
        };
        if let Err(e) = std::fs::write(out.join("a.hex"), b":00000001FF") {
            panic!("write: {e}");
        }
        let path = ws.path().to_path_buf();
        if let Err(e) = ws.release().await {
            panic!("release failed: {e}");
        }
        assert!(!path.exists(), "workspace must be gone after release");
    }

    #[tokio::test]
    async fn drop_without_release_still_removes_tree() {
        let root = scratch();
        let ws = acquire_in(root.path()).await;
        let path = ws.path().to_path_buf();
        drop(ws);
        assert!(!path.exists(), "dropped workspace must be removed");
    }

    #[tokio::test]
    async fn concurrent_acquires_get_distinct_directories() {
        let root = scratch();
        let mut handles = Vec::new();
        for _ in 0..16 {
            let root = root.path().to_path_buf();
            handles.push(tokio::spawn(async move { Workspace::acquire(Some(&root)).await }));
        }
        let mut workspaces = Vec::new();
        for handle in handles {
            match handle.await {
                Ok(Ok(ws)) => workspaces.push(ws),
                Ok(Err(e)) => panic!("acquire failed: {e}"),
                Err(e) => panic!("task panicked: {e}"),
            }
        }
        let mut names: Vec<&str> = workspaces.iter().map(Workspace::name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 16, "workspace names must be unique");
    }

    #[tokio::test]
    async fn make_output_dir_twice_fails() {
        let root = scratch();
        let ws = acquire_in(root.path()).await;
        assert!(ws.make_output_dir().await.is_ok());
        assert!(matches!(ws.make_output_dir().await, Err(ExecutorError::OutputDir(_))));
    }

    #[tokio::test]
    async fn acquire_under_missing_root_fails_cleanly() {
        let root = scratch();
        let missing = root.path().join("does-not-exist");
        let result = Workspace::acquire(Some(&missing)).await;
        assert!(matches!(result, Err(ExecutorError::WorkspaceAllocation(_))));
        assert!(!missing.exists());
    }
}
