//! External process invocation.
//!
//! Every task talks to `git`, `gh`, `docker` and `uv` through the
//! [`CommandRunner`] trait so the task logic can be exercised with scripted
//! process results.

use std::fmt;
use std::process::{Command, Stdio};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` failed: {stderr}")]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

/// A program plus its arguments, built up before execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Appends `arg` only when `condition` holds.
    pub fn arg_if(self, condition: bool, arg: impl Into<String>) -> Self {
        if condition { self.arg(arg) } else { self }
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{}'", arg.replace('\'', "'\\''"))?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Result of running a command to completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Converts a non-zero exit into [`RunnerError::Failed`].
    pub fn check(self, command: &CommandLine) -> Result<Self, RunnerError> {
        if self.success() {
            Ok(self)
        } else {
            Err(RunnerError::Failed {
                command: command.to_string(),
                code: self.code,
                stderr: self.stderr.trim().to_string(),
            })
        }
    }
}

/// Seam between the tasks and the operating system's processes.
pub trait CommandRunner {
    /// Runs the command with captured stdout and stderr.
    fn output(&self, command: &CommandLine) -> Result<CommandOutput, RunnerError>;

    /// Runs the command attached to the user's terminal.
    ///
    /// Nothing is captured; the returned output only carries the exit code.
    fn interactive(&self, command: &CommandLine) -> Result<CommandOutput, RunnerError>;

    /// Runs the command and returns its trimmed stdout, failing on non-zero exit.
    fn capture(&self, command: &CommandLine) -> Result<String, RunnerError> {
        let output = self.output(command)?.check(command)?;
        Ok(output.stdout.trim().to_string())
    }

    /// Runs the command on the terminal, failing on non-zero exit.
    fn stream(&self, command: &CommandLine) -> Result<(), RunnerError> {
        self.interactive(command)?.check(command)?;
        Ok(())
    }
}

/// Runs commands with `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn output(&self, command: &CommandLine) -> Result<CommandOutput, RunnerError> {
        tracing::debug!(%command, "running");
        let output = Command::new(&command.program)
            .args(&command.args)
            .output()
            .map_err(|source| RunnerError::Spawn {
                program: command.program.clone(),
                source,
            })?;

        let result = CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };
        tracing::debug!(%command, code = ?result.code, "finished");
        Ok(result)
    }

    fn interactive(&self, command: &CommandLine) -> Result<CommandOutput, RunnerError> {
        tracing::debug!(%command, "running attached to terminal");
        let status = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| RunnerError::Spawn {
                program: command.program.clone(),
                source,
            })?;

        tracing::debug!(%command, code = ?status.code(), "finished");
        Ok(CommandOutput {
            code: status.code(),
            ..CommandOutput::default()
        })
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedRunner;
    use super::*;

    #[test]
    fn test_display_quotes_arguments_with_spaces() {
        let cmd = CommandLine::new("git").args(["commit", "-m", "feat: add search"]);
        assert_eq!(cmd.to_string(), "git commit -m 'feat: add search'");
    }

    #[test]
    fn test_arg_if_skips_false_condition() {
        let cmd = CommandLine::new("docker")
            .arg("run")
            .arg_if(false, "--gpus")
            .arg_if(true, "--rm");
        assert_eq!(cmd.args, vec!["run", "--rm"]);
    }

    #[test]
    fn test_check_reports_failure() {
        let cmd = CommandLine::new("git").arg("push");
        let err = CommandOutput::failed(128, "no upstream\n")
            .check(&cmd)
            .unwrap_err();
        match err {
            RunnerError::Failed { command, code, stderr } => {
                assert_eq!(command, "git push");
                assert_eq!(code, Some(128));
                assert_eq!(stderr, "no upstream");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_capture_trims_stdout() {
        let runner = ScriptedRunner::new()
            .respond("git symbolic-ref --short HEAD", CommandOutput::ok("main\n"));
        let cmd = CommandLine::new("git").args(["symbolic-ref", "--short", "HEAD"]);
        assert_eq!(runner.capture(&cmd).unwrap(), "main");
    }

    #[test]
    fn test_scripted_runner_consumes_responses_in_order() {
        let runner = ScriptedRunner::new()
            .respond("git push", CommandOutput::failed(1, "boom"))
            .respond("git push", CommandOutput::ok(""));
        let cmd = CommandLine::new("git").arg("push");
        assert!(!runner.output(&cmd).unwrap().success());
        assert!(runner.output(&cmd).unwrap().success());
        assert_eq!(runner.count("git push"), 2);
    }

    #[test]
    fn test_system_runner_reports_missing_program() {
        let cmd = CommandLine::new("gtasks-definitely-not-a-real-program");
        let err = SystemRunner.output(&cmd).unwrap_err();
        assert!(matches!(err, RunnerError::Spawn { .. }));
    }
}
