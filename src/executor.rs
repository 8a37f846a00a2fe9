//! Shell execution of generated commands.
//!
//! The generated text is handed to a shell as a single `-c` argument, so
//! pipes, redirection, globbing, and quoting are interpreted by the shell
//! rather than by this crate. Running arbitrary user-approved commands can of
//! course create, modify, or delete filesystem state; that is the point of
//! the tool, and execution only happens after the configured confirmation
//! policy allows it.

use anyhow::{anyhow, Result};
use std::process::{Command, Output};
use tracing::{error, info};

/// Trait for running system processes.
///
/// This abstraction enables testing without spawning real processes.
pub trait ProcessRunner: Send + Sync {
    /// Executes a program with arguments and returns its output.
    fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
}

/// Default process runner using std::process::Command.
pub struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        Ok(cmd.output()?)
    }
}

/// Executes generated command strings through the user's shell.
pub struct ShellExecutor {
    shell: String,
}

impl ShellExecutor {
    /// Uses `$SHELL`, falling back to `/bin/sh`.
    pub fn new() -> Self {
        Self {
            shell: std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string()),
        }
    }

    pub fn with_shell(shell: &str) -> Self {
        Self {
            shell: shell.to_string(),
        }
    }

    /// Run a command string and return combined stdout+stderr.
    ///
    /// A non-zero exit status or a shell that cannot be started is an error.
    pub fn execute(&self, command: &str) -> Result<String> {
        self.execute_with_runner(command, &SystemProcessRunner)
    }

    /// Run with an injected process runner (for testing).
    pub fn execute_with_runner(&self, command: &str, runner: &impl ProcessRunner) -> Result<String> {
        info!("Executing via {}: {}", self.shell, command);

        let output = runner
            .run(&self.shell, &["-c", command])
            .map_err(|e| anyhow!("could not start {}: {}", self.shell, e))?;

        let mut combined = String::from_utf8_lossy(&output.stdout).to_string();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            error!("Command failed with status: {}", output.status);
            return Err(anyhow!(
                "command exited with {}: {}",
                output.status,
                combined.trim_end()
            ));
        }

        Ok(combined)
    }
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::process::ExitStatusExt;
    use std::process::ExitStatus;
    use std::sync::Mutex;

    struct MockProcessRunner {
        output: Output,
        calls: Mutex<Vec<(String, Vec<String>)>>,
    }

    impl MockProcessRunner {
        fn success(stdout: &str, stderr: &str) -> Self {
            Self {
                output: Output {
                    status: ExitStatus::from_raw(0),
                    stdout: stdout.as_bytes().to_vec(),
                    stderr: stderr.as_bytes().to_vec(),
                },
                calls: Mutex::new(vec![]),
            }
        }

        fn failure(stderr: &str) -> Self {
            Self {
                output: Output {
                    status: ExitStatus::from_raw(1 << 8), // Exit code 1
                    stdout: vec![],
                    stderr: stderr.as_bytes().to_vec(),
                },
                calls: Mutex::new(vec![]),
            }
        }
    }

    impl ProcessRunner for MockProcessRunner {
        fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
            self.calls.lock().unwrap().push((
                program.to_string(),
                args.iter().map(|s| s.to_string()).collect(),
            ));
            Ok(self.output.clone())
        }
    }

    #[test]
    fn test_command_passed_to_shell_as_single_argument() {
        let executor = ShellExecutor::with_shell("/bin/sh");
        let runner = MockProcessRunner::success("", "");

        executor
            .execute_with_runner("ls | grep foo > out.txt", &runner)
            .unwrap();

        let calls = runner.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "/bin/sh");
        assert_eq!(calls[0].1, vec!["-c", "ls | grep foo > out.txt"]);
    }

    #[test]
    fn test_success_returns_combined_output() {
        let executor = ShellExecutor::with_shell("/bin/sh");
        let runner = MockProcessRunner::success("stdout line\n", "stderr line\n");

        let output = executor.execute_with_runner("true", &runner).unwrap();
        assert_eq!(output, "stdout line\nstderr line\n");
    }

    #[test]
    fn test_non_zero_exit_is_error() {
        let executor = ShellExecutor::with_shell("/bin/sh");
        let runner = MockProcessRunner::failure("no such file\n");

        let result = executor.execute_with_runner("cat missing", &runner);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("no such file"));
    }

    #[test]
    fn test_empty_output_is_ok() {
        let executor = ShellExecutor::with_shell("/bin/sh");
        let runner = MockProcessRunner::success("", "");

        let output = executor.execute_with_runner("true", &runner).unwrap();
        assert!(output.is_empty());
    }

    #[test]
    fn test_real_shell_roundtrip() {
        let executor = ShellExecutor::with_shell("/bin/sh");
        let output = executor.execute("echo hello").unwrap();
        assert_eq!(output.trim(), "hello");
    }

    #[test]
    fn test_real_shell_failure() {
        let executor = ShellExecutor::with_shell("/bin/sh");
        assert!(executor.execute("exit 3").is_err());
    }
}
