//! # contract: seams between the pipeline and the outside world
//!
//! Every external program the pipeline touches (retrieval helper, archive
//! tools, file-type detector, downstream scripts) is reached through
//! [`CommandRunner`]. Populating the work directory goes through [`Fetcher`].
//!
//! ## Mocking & Testing
//! - Both traits are annotated for `mockall`, so integration tests can script
//!   exit statuses and detector output without touching real tools.
//! - Mocks are exported behind the `test-export-mocks` feature.
//!
//! ## Working directories
//! The process never changes its own current directory. Each [`Invocation`]
//! carries the directory the child runs in.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{CommandError, FetchError};

/// A single external program call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    /// Directory the child process runs in.
    pub cwd: PathBuf,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Arguments as lossy UTF-8, for logging and assertions.
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    /// Program path as lossy UTF-8.
    pub fn program_name(&self) -> String {
        self.program.display().to_string()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Captured result of a finished external program.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// Exit code, `None` when the child was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
}

impl CommandOutput {
    /// A zero exit status with no output.
    pub fn success() -> Self {
        Self {
            code: Some(0),
            stdout: String::new(),
        }
    }

    pub fn exited(code: i32) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
        }
    }

    pub fn with_stdout(mut self, stdout: impl Into<String>) -> Self {
        self.stdout = stdout.into();
        self
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs external programs to completion.
///
/// Implementations only report launch failures as errors. A program that ran
/// and exited non-zero is a successful call with a non-zero [`CommandOutput::code`].
#[cfg_attr(any(test, feature = "test-export-mocks"), mockall::automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, CommandError>;
}

/// Runs programs on the host with `tokio::process`.
///
/// Stdin is closed so interactive prompts cannot wait on the operator's
/// terminal, stdout is captured, and stderr is passed through.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, CommandError> {
        debug!(
            command = %invocation,
            cwd = %invocation.cwd.display(),
            "Running external command"
        );
        let output = tokio::process::Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .output()
            .await
            .map_err(|source| CommandError::Spawn {
                program: invocation.program_name(),
                source,
            })?;

        let result = CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        };
        debug!(
            command = %invocation,
            code = ?result.code,
            stdout_len = result.stdout.len(),
            "External command finished"
        );
        Ok(result)
    }
}

/// Populates a freshly created work directory with the file behind `url`.
///
/// On success the directory holds exactly one entry and its path is returned.
#[cfg_attr(any(test, feature = "test-export-mocks"), mockall::automock)]
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str, dest_dir: &Path) -> Result<PathBuf, FetchError>;
}
