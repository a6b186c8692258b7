//! Error and outcome types shared by every pipeline stage.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::sniff::ArchiveFormat;

/// Failure to launch an external program at all.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// Why an external tool did not succeed.
#[derive(Debug, thiserror::Error)]
pub enum ToolFailure {
    #[error(transparent)]
    Launch(#[from] CommandError),
    #[error("{program} exited with {}", describe_exit(*code))]
    Exited { program: String, code: Option<i32> },
}

/// Errors raised while populating the work directory with the downloaded file.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error(transparent)]
    Helper(#[from] CommandError),
    #[error("retrieval helper exited with {}", describe_exit(*code))]
    HelperExited { code: Option<i32> },
    #[error("fetch produced no file")]
    NoFile,
    #[error("fetch produced {count} entries, expected exactly one")]
    MultipleFiles { count: usize },
    #[error("download request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("download returned HTTP status {status}")]
    HttpStatus { status: u16 },
    #[error("I/O error while fetching: {0}")]
    Io(#[from] io::Error),
}

/// Everything that can stop a run before it reaches [`Outcome::Success`].
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("failed to read message {}: {source}", path.display())]
    ReadMessage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse message: {0}")]
    ParseMessage(#[from] mailparse::MailParseError),
    #[error("no download link found in message body")]
    NoLinkFound,
    #[error("failed to create work directory under {}: {source}", root.display())]
    WorkDir {
        root: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("fetch failed: {source}")]
    FetchFailed {
        dir: PathBuf,
        #[source]
        source: FetchError,
    },
    #[error("unrecognised archive format for {}", file.display())]
    UnknownFormat { dir: PathBuf, file: PathBuf },
    #[error("{format} extraction failed: {source}")]
    ExtractionFailed {
        dir: PathBuf,
        format: ArchiveFormat,
        #[source]
        source: ToolFailure,
    },
    #[error("post-processor {} failed: {source}", script.display())]
    PostProcessingFailed {
        dir: PathBuf,
        script: PathBuf,
        #[source]
        source: ToolFailure,
    },
}

impl IntakeError {
    /// The terminal outcome for this error. Input errors (unreadable or
    /// unparseable message, no work directory) have none.
    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            IntakeError::ReadMessage { .. }
            | IntakeError::ParseMessage(_)
            | IntakeError::WorkDir { .. } => None,
            IntakeError::NoLinkFound => Some(Outcome::NoLinkFound),
            IntakeError::FetchFailed { .. } => Some(Outcome::FetchFailed),
            IntakeError::UnknownFormat { .. } => Some(Outcome::UnknownFormat),
            IntakeError::ExtractionFailed { .. } => Some(Outcome::ExtractionFailed),
            IntakeError::PostProcessingFailed { .. } => Some(Outcome::PostProcessingFailed),
        }
    }

    /// The work directory left on disk for manual inspection, if one was created.
    pub fn retained_dir(&self) -> Option<&Path> {
        match self {
            IntakeError::FetchFailed { dir, .. }
            | IntakeError::UnknownFormat { dir, .. }
            | IntakeError::ExtractionFailed { dir, .. }
            | IntakeError::PostProcessingFailed { dir, .. } => Some(dir),
            _ => None,
        }
    }
}

/// Terminal classification of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum Outcome {
    Success,
    NoLinkFound,
    FetchFailed,
    UnknownFormat,
    ExtractionFailed,
    PostProcessingFailed,
}

impl Outcome {
    /// Process exit status reported by the CLI for this outcome.
    pub fn exit_code(self) -> u8 {
        match self {
            Outcome::Success => 0,
            Outcome::NoLinkFound => 2,
            Outcome::FetchFailed => 3,
            Outcome::UnknownFormat => 4,
            Outcome::ExtractionFailed => 5,
            Outcome::PostProcessingFailed => 6,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Outcome::Success => "Success",
            Outcome::NoLinkFound => "NoLinkFound",
            Outcome::FetchFailed => "FetchFailed",
            Outcome::UnknownFormat => "UnknownFormat",
            Outcome::ExtractionFailed => "ExtractionFailed",
            Outcome::PostProcessingFailed => "PostProcessingFailed",
        };
        f.write_str(name)
    }
}

fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}
