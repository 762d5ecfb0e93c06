//! `arduino-cli` toolchain backend.
//!
//! Every call runs `"<invocation> <subcommand ...>"` through `sh -c`, so the
//! configured invocation may itself be a shell fragment such as
//! `arduino-cli --config-file /etc/waca/arduino-cli.yaml`.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::backend::{CompileInvocation, ProcessOutput, Toolchain, ToolchainDirs};
use crate::shell::{run_shell, shell_escape, shell_escape_path};
use crate::ExecutorError;

/// Default bound on version, config, board and library queries.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Library entry fields that expose installation paths.
const LIBRARY_LOCATION_FIELDS: [&str; 3] = ["install_dir", "source_dir", "examples"];

/// `arduino-cli` backend.
#[derive(Debug, Clone)]
pub struct ArduinoCli {
    /// Command prefix, e.g. `arduino-cli`.
    invocation: String,

    /// Bound on every non-compile query.
    query_timeout: Duration,
}

impl ArduinoCli {
    /// Create a backend with the given invocation prefix.
    ///
    /// # Arguments
    /// - `invocation`: shell fragment that starts the toolchain
    /// - `query_timeout`: bound on version, config, board and library queries
    #[must_use]
    pub fn new(invocation: impl Into<String>, query_timeout: Duration) -> Self {
        Self { invocation: invocation.into(), query_timeout }
    }

    /// Create a backend that looks up `arduino-cli` in `$PATH`.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new("arduino-cli", DEFAULT_QUERY_TIMEOUT)
    }

    #[must_use]
    pub fn invocation(&self) -> &str {
        &self.invocation
    }

    async fn query(&self, args: &str) -> Result<String, ExecutorError> {
        let command = format!("{} {args}", self.invocation);
        let output = run_shell(&command, None, self.query_timeout).await?;
        if !output.success {
            return Err(ExecutorError::ToolchainQuery(format!(
                "`{args}` exited with {:?}",
                output.exit_code
            )));
        }
        Ok(output.stdout)
    }

    async fn query_json(&self, args: &str) -> Result<Value, ExecutorError> {
        let stdout = self.query(args).await?;
        serde_json::from_str(&stdout)
            .map_err(|e| ExecutorError::ToolchainQuery(format!("`{args}` returned invalid JSON: {e}")))
    }
}

impl Default for ArduinoCli {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[async_trait]
impl Toolchain for ArduinoCli {
    async fn version(&self) -> Result<String, ExecutorError> {
        let stdout = self.query("version").await?;
        Ok(stdout.trim().to_owned())
    }

    async fn directories(&self) -> Result<ToolchainDirs, ExecutorError> {
        let dump = self.query_json("config dump --format json").await?;
        parse_directories(&dump)
    }

    async fn board_list(&self) -> Result<Value, ExecutorError> {
        let listing = self.query_json("board listall --format json").await?;
        Ok(extract_boards(listing))
    }

    async fn library_list(&self) -> Result<Value, ExecutorError> {
        let listing = self.query_json("lib list --format json").await?;
        prune_library_entries(listing)
    }

    async fn compile(
        &self,
        invocation: &CompileInvocation<'_>,
        timeout: Duration,
    ) -> Result<ProcessOutput, ExecutorError> {
        let command = build_compile_command(&self.invocation, invocation);
        tracing::debug!(%command, "invoking compiler");
        run_shell(&command, Some(invocation.workspace), timeout).await
    }
}

/// Build the compile command line.
///
/// `<invocation> compile [-v] -b <board> --output-dir <dir> --warnings <level> <sketch>`
#[must_use]
pub fn build_compile_command(prefix: &str, invocation: &CompileInvocation<'_>) -> String {
    let verbose = if invocation.verbose { " -v" } else { "" };
    format!(
        "{prefix} compile{verbose} -b {board} --output-dir {out} --warnings {warnings} {sketch}",
        board = shell_escape(invocation.board.as_str()),
        out = shell_escape_path(invocation.output_dir),
        warnings = invocation.warnings.as_str(),
        sketch = shell_escape_path(invocation.sketch_path),
    )
}

/// Read `directories.{data,user,downloads}` from a config dump.
///
/// Accepts both the flat layout and the newer one nested under `config`.
fn parse_directories(dump: &Value) -> Result<ToolchainDirs, ExecutorError> {
    let directories = dump
        .get("directories")
        .or_else(|| dump.get("config").and_then(|c| c.get("directories")))
        .ok_or_else(|| ExecutorError::ToolchainQuery("config dump has no `directories`".to_owned()))?;

    let dir = |key: &str| {
        directories
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
    };

    Ok(ToolchainDirs::new(dir("data"), dir("user"), dir("downloads")))
}

/// Pull the `boards` array out of a `board listall` response.
fn extract_boards(mut listing: Value) -> Value {
    match listing.get_mut("boards").map(Value::take) {
        Some(boards @ Value::Array(_)) => boards,
        _ => Value::Array(Vec::new()),
    }
}

/// Strip filesystem locations from every `lib list` entry.
///
/// Accepts a bare array or `{"installed_libraries": [...]}` and returns the array.
///
/// # Errors
/// Returns [`ExecutorError::ToolchainQuery`] if no entry array is present.
pub fn prune_library_entries(listing: Value) -> Result<Value, ExecutorError> {
    let mut entries = match listing {
        Value::Array(entries) => entries,
        Value::Object(mut fields) => match fields.remove("installed_libraries") {
            Some(Value::Array(entries)) => entries,
            None | Some(Value::Null) => Vec::new(),
            Some(_) => {
                return Err(ExecutorError::ToolchainQuery(
                    "`installed_libraries` is not an array".to_owned(),
                ))
            }
        },
        _ => {
            return Err(ExecutorError::ToolchainQuery(
                "library listing is not an array".to_owned(),
            ))
        }
    };

    for entry in &mut entries {
        if let Some(library) = entry.get_mut("library").and_then(Value::as_object_mut) {
            for field in LIBRARY_LOCATION_FIELDS {
                library.remove(field);
            }
        }
    }
    Ok(Value::Array(entries))
}
