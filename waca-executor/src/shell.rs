//! Shell command construction and bounded child-process execution.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::backend::ProcessOutput;
use crate::ExecutorError;

/// Exit status `sh` uses when a command exists but cannot be executed.
const SHELL_NOT_EXECUTABLE: i32 = 126;
/// Exit status `sh` uses when a command is not found.
const SHELL_NOT_FOUND: i32 = 127;

/// Quote a value as a single POSIX shell word.
#[must_use]
pub fn shell_escape(value: &str) -> String {
    let escaped = value.replace('\'', "'\"'\"'");
    format!("'{escaped}'")
}

/// Quote a path as a single POSIX shell word.
#[must_use]
pub fn shell_escape_path(path: &Path) -> String {
    shell_escape(&path.to_string_lossy())
}

/// Kills a spawned process group unless disarmed.
///
/// The shell leads its own group, so every descendant (compiler, linker,
/// anything backgrounded) is reached through the group id.
struct ProcessGroupGuard {
    pgid: Option<u32>,
}

impl ProcessGroupGuard {
    fn new(pgid: Option<u32>) -> Self {
        Self { pgid }
    }

    fn disarm(mut self) {
        self.pgid = None;
    }
}

impl Drop for ProcessGroupGuard {
    fn drop(&mut self) {
        if let Some(pgid) = self.pgid.take() {
            kill_process_group(pgid);
        }
    }
}

#[cfg(unix)]
fn kill_process_group(pgid: u32) {
    let Ok(pgid) = libc::pid_t::try_from(pgid) else {
        return;
    };
    // SAFETY: kill(2) has no memory-safety preconditions; a negative pid
    // addresses the process group.
    let rc = unsafe { libc::kill(-pgid, libc::SIGKILL) };
    if rc == -1 {
        let err = std::io::Error::last_os_error();
        if err.raw_os_error() != Some(libc::ESRCH) {
            tracing::warn!(pgid, error = %err, "failed to kill toolchain process group");
        }
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pgid: u32) {}

/// Run `command` through `sh -c`, capturing stdout and stderr.
///
/// The shell runs in a fresh process group. If `timeout` elapses or the
/// returned future is dropped, the whole group is killed, not just the shell.
///
/// # Errors
/// Returns [`ExecutorError::Launch`] if `sh` cannot be spawned or reports the
/// command as missing or not executable, and [`ExecutorError::Timeout`] if the
/// bound elapses.
pub(crate) async fn run_shell(
    command: &str,
    cwd: Option<&Path>,
    timeout: Duration,
) -> Result<ProcessOutput, ExecutorError> {
    let mut cmd = Command::new("sh");
    cmd.arg("-c")
        .arg(command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    cmd.process_group(0);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    let child = cmd
        .spawn()
        .map_err(|e| ExecutorError::Launch(format!("spawn sh: {e}")))?;
    let group = ProcessGroupGuard::new(child.id());

    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(output) => {
            group.disarm();
            output.map_err(|e| ExecutorError::Launch(format!("wait for child: {e}")))?
        }
        Err(_) => {
            drop(group);
            return Err(ExecutorError::Timeout { secs: timeout.as_secs() });
        }
    };

    let exit_code = output.status.code();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    if matches!(exit_code, Some(SHELL_NOT_EXECUTABLE | SHELL_NOT_FOUND)) {
        return Err(ExecutorError::Launch(format!(
            "shell exited with {}: {}",
            exit_code.unwrap_or_default(),
            stderr.trim()
        )));
    }

    Ok(ProcessOutput {
        success: output.status.success(),
        exit_code,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr,
    })
}
