//! External process execution with a timeout
//!
//! [`CommandRunner`] is the seam between the adapter and real processes.
//! Tests substitute a scripted runner; production uses [`SystemRunner`].

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

/// Default per-command timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// How a command invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    /// Exited with status 0
    Success,
    /// Exited with a non-zero status (or was killed by a signal)
    Failed { code: Option<i32> },
    /// Did not finish within the timeout and was killed
    TimedOut,
    /// Could not be started at all
    LaunchFailed,
}

/// Result of running a command: a status plus one diagnostic string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub status: RunStatus,
    /// Trimmed stdout on success, stderr (or stdout if stderr is empty) on
    /// failure, a fixed message on timeout, the OS error on launch failure.
    pub output: String,
}

impl CommandOutput {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            status: RunStatus::Success,
            output: output.into(),
        }
    }

    pub fn failure(code: Option<i32>, output: impl Into<String>) -> Self {
        Self {
            status: RunStatus::Failed { code },
            output: output.into(),
        }
    }

    pub fn timed_out(timeout: Duration) -> Self {
        Self {
            status: RunStatus::TimedOut,
            output: format!("Command timed out after {} seconds", timeout.as_secs_f64()),
        }
    }

    pub fn launch_failed(message: impl Into<String>) -> Self {
        Self {
            status: RunStatus::LaunchFailed,
            output: message.into(),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.status == RunStatus::Success
    }

    pub fn is_timeout(&self) -> bool {
        self.status == RunStatus::TimedOut
    }
}

/// Runs external programs.
///
/// Implementations must not panic or return errors for command failures;
/// every outcome is folded into a [`CommandOutput`].
pub trait CommandRunner {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        working_dir: Option<&Path>,
        timeout: Duration,
    ) -> CommandOutput;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        working_dir: Option<&Path>,
        timeout: Duration,
    ) -> CommandOutput {
        (**self).run(program, args, working_dir, timeout)
    }
}

/// Runs real processes, blocking the caller until exit or timeout.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        working_dir: Option<&Path>,
        timeout: Duration,
    ) -> CommandOutput {
        tracing::debug!(
            program,
            ?args,
            cwd = ?working_dir,
            timeout_secs = timeout.as_secs(),
            "run command"
        );

        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(e) => return CommandOutput::launch_failed(format!("Failed to start runtime: {e}")),
        };

        let result = runtime.block_on(run_with_timeout(program, args, working_dir, timeout));
        if !result.succeeded() {
            tracing::debug!(program, status = ?result.status, output = %result.output, "command failed");
        }
        result
    }
}

async fn run_with_timeout(
    program: &str,
    args: &[&str],
    working_dir: Option<&Path>,
    timeout: Duration,
) -> CommandOutput {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = working_dir {
        cmd.current_dir(dir);
    }

    let child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => return CommandOutput::launch_failed(format!("Failed to run {program}: {e}")),
    };

    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => {
            let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if output.status.success() {
                CommandOutput::success(stdout)
            } else {
                let message = if stderr.is_empty() { stdout } else { stderr };
                CommandOutput::failure(output.status.code(), message)
            }
        }
        Ok(Err(e)) => CommandOutput::launch_failed(format!("Failed to wait for {program}: {e}")),
        Err(_) => {
            tracing::warn!(program, timeout_secs = timeout.as_secs(), "command timed out");
            CommandOutput::timed_out(timeout)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_is_distinct() {
        let out = CommandOutput::timed_out(Duration::from_secs(300));
        assert_eq!(out.output, "Command timed out after 300 seconds");
        assert!(!out.succeeded());
        assert!(out.is_timeout());
    }

    #[test]
    fn missing_program_is_launch_failure() {
        let out = SystemRunner.run(
            "definitely-not-a-real-program-7f3a",
            &[],
            None,
            Duration::from_secs(5),
        );
        assert_eq!(out.status, RunStatus::LaunchFailed);
        assert!(!out.output.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn captures_stdout_on_success() {
        let out = SystemRunner.run("sh", &["-c", "echo hello"], None, Duration::from_secs(5));
        assert!(out.succeeded());
        assert_eq!(out.output, "hello");
    }

    #[cfg(unix)]
    #[test]
    fn captures_stderr_and_code_on_failure() {
        let out = SystemRunner.run(
            "sh",
            &["-c", "echo out; echo broken >&2; exit 3"],
            None,
            Duration::from_secs(5),
        );
        assert_eq!(out.status, RunStatus::Failed { code: Some(3) });
        assert_eq!(out.output, "broken");
    }

    #[cfg(unix)]
    #[test]
    fn slow_command_times_out() {
        let out = SystemRunner.run("sleep", &["5"], None, Duration::from_millis(200));
        assert_eq!(out.status, RunStatus::TimedOut);
        assert_eq!(out.output, "Command timed out after 0.2 seconds");
    }

    #[cfg(unix)]
    #[test]
    fn honours_working_directory() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join("marker.txt"), "").unwrap();
        let out = SystemRunner.run("ls", &[], Some(temp.path()), Duration::from_secs(5));
        assert!(out.succeeded());
        assert!(out.output.contains("marker.txt"));
    }
}
