//! Settings the compile pipeline is constructed with.

use std::path::PathBuf;
use std::time::Duration;

/// Default upper bound on a single compile.
pub const DEFAULT_COMPILE_TIMEOUT: Duration = Duration::from_secs(120);

/// Static support files injected for one board family on request.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct AuxiliaryFiles {
    /// Directory whose regular files are copied into the workspace root.
    pub source_dir: PathBuf,

    /// Board family prefix (ASCII case-insensitive) that enables the copy.
    pub board_prefix: String,
}

impl AuxiliaryFiles {
    #[must_use]
    pub fn new(source_dir: PathBuf, board_prefix: impl Into<String>) -> Self {
        Self { source_dir, board_prefix: board_prefix.into() }
    }
}

impl Default for AuxiliaryFiles {
    fn default() -> Self {
        Self::new(PathBuf::from("extra-libs"), "attinycore:avr")
    }
}

/// Per-process compile settings, built once at startup.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct CompileSettings {
    /// Maximum wall-clock time for one toolchain run.
    pub timeout: Duration,

    /// Parent of every workspace. `None` uses the system temp directory.
    pub temp_root: Option<PathBuf>,

    /// LCD support files.
    pub auxiliary: AuxiliaryFiles,
}

impl CompileSettings {
    #[must_use]
    pub fn new(timeout: Duration, temp_root: Option<PathBuf>, auxiliary: AuxiliaryFiles) -> Self {
        Self { timeout, temp_root, auxiliary }
    }
}

impl Default for CompileSettings {
    fn default() -> Self {
        Self::new(DEFAULT_COMPILE_TIMEOUT, None, AuxiliaryFiles::default())
    }
}
