//! External command execution

use std::path::PathBuf;
use std::process::Command;

use tracing::info;

use crate::error::Result;

/// Exit status and captured output of a finished command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// One-line description of a failure, for error messages
    pub fn describe(&self) -> String {
        let status = match self.code {
            Some(code) => format!("exit code {}", code),
            None => "terminated by signal".to_string(),
        };
        match self.stderr.lines().rev().find(|line| !line.trim().is_empty()) {
            Some(line) => format!("{}: {}", status, line.trim()),
            None => status,
        }
    }
}

/// Runs the prepare and publish commands
pub trait CommandRunner {
    /// Run `command`; a non-zero exit is reported in the output, not as an error
    fn run(&self, command: &str) -> Result<CommandOutput>;
}

/// Runs commands through `sh -c`
#[derive(Debug, Clone, Default)]
pub struct ShellRunner {
    working_dir: Option<PathBuf>,
}

impl ShellRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self { working_dir: Some(dir.into()) }
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str) -> Result<CommandOutput> {
        info!("Running: {}", command);
        let mut process = Command::new("sh");
        process.arg("-c").arg(command);
        if let Some(dir) = &self.working_dir {
            process.current_dir(dir);
        }
        let output = process.output()?;
        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
