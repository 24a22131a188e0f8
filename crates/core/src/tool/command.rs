use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// A process invocation: program, arguments, working directory and extra
/// environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellCommand {
    pub program: String,
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<(String, String)>,
}

impl ShellCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            env: Vec::new(),
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

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Render as a single line suitable for a terminal or a log message
    pub fn to_shell_command(&self) -> String {
        let mut cmd = quote(&self.program);
        for arg in &self.args {
            cmd.push(' ');
            cmd.push_str(&quote(arg));
        }
        cmd
    }

    fn to_process(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(ref dir) = self.working_dir {
            cmd.current_dir(dir);
        }
        for (key, value) in &self.env {
            cmd.env(key, value);
        }
        cmd
    }

    /// Run with inherited stdio and wait for the exit status
    pub async fn execute(&self) -> Result<ExitStatus> {
        debug!("Executing: {}", self.to_shell_command());
        Ok(self.to_process().status().await?)
    }
}

fn quote(arg: &str) -> String {
    if arg.is_empty() {
        "''".to_string()
    } else if arg.contains(char::is_whitespace) || arg.contains('\'') || arg.contains('"') {
        format!("'{}'", arg.replace('\'', r"'\''"))
    } else {
        arg.to_string()
    }
}

/// Run `command`, returning its stdout.
///
/// Rejects with [`Error::Timeout`] once `timeout` elapses; the child is
/// killed when its handle is dropped so nothing outlives the call.
pub async fn exec_with_timeout(command: &ShellCommand, timeout: Duration) -> Result<String> {
    let rendered = command.to_shell_command();
    debug!("Running `{}` (timeout {}ms)", rendered, timeout.as_millis());

    let child = command
        .to_process()
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;

    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(output) => output?,
        Err(_) => {
            return Err(Error::Timeout {
                command: rendered,
                timeout,
            });
        }
    };

    if !output.status.success() {
        return Err(Error::CommandFailed {
            command: rendered,
            status: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_to_shell_command_quotes_arguments() {
        let cmd = ShellCommand::new("pixi")
            .args(["run", "--manifest-path", "/my projects/pixi.toml"])
            .arg("it's");
        assert_eq!(
            cmd.to_shell_command(),
            r"pixi run --manifest-path '/my projects/pixi.toml' 'it'\''s'"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exec_resolves_with_output() {
        let cmd = ShellCommand::new("sh").args(["-c", "echo \"Hello, World!\""]);
        let output = exec_with_timeout(&cmd, Duration::from_secs(5)).await.unwrap();
        assert_eq!(output, "Hello, World!\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exec_rejects_on_timeout_without_hanging() {
        let cmd = ShellCommand::new("sh").args(["-c", "sleep 5"]);
        let started = Instant::now();

        let err = exec_with_timeout(&cmd, Duration::from_millis(200))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Timeout { .. }), "unexpected error: {err}");
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exec_reports_failures() {
        let cmd = ShellCommand::new("sh").args(["-c", "echo broken >&2; exit 3"]);
        match exec_with_timeout(&cmd, Duration::from_secs(5)).await {
            Err(Error::CommandFailed { status, stderr, .. }) => {
                assert_eq!(status, 3);
                assert_eq!(stderr, "broken");
            }
            other => panic!("expected CommandFailed, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exec_honours_working_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let cmd = ShellCommand::new("pwd").with_working_dir(dir.path());
        let output = exec_with_timeout(&cmd, Duration::from_secs(5)).await.unwrap();
        let expected = dir.path().canonicalize().unwrap();
        assert_eq!(
            std::path::Path::new(output.trim()).canonicalize().unwrap(),
            expected
        );
    }
}
