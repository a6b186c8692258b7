//! Working out which archive tool a downloaded file needs.
//!
//! Sniffing runs in two stages:
//! 1. the file-name suffix (`.zip`, `.rar`, `.7z`, `.7-zip`, any case);
//! 2. only if that fails, the file-type detector's description, searched for
//!    `<type> archive data`.
//!
//! If neither stage recognises the file, there is no format and nothing is extracted.

use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::contract::{CommandRunner, Invocation};

static SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(zip|rar|7z|7-zip)$").expect("static suffix pattern"));
static DESCRIPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(zip|rar|7z|7-zip) archive data").expect("static description pattern")
});

/// Archive formats the pipeline knows how to extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveFormat {
    Zip,
    #[serde(rename = "7z")]
    SevenZip,
    Rar,
}

impl ArchiveFormat {
    /// Maps a type token (`zip`, `rar`, `7z`, `7-zip`, any case) to a format.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "zip" => Some(ArchiveFormat::Zip),
            "7z" | "7-zip" => Some(ArchiveFormat::SevenZip),
            "rar" => Some(ArchiveFormat::Rar),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::SevenZip => "7z",
            ArchiveFormat::Rar => "rar",
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stage 1: the format implied by the file name's suffix.
pub fn format_from_suffix(path: &Path) -> Option<ArchiveFormat> {
    let name = path.file_name()?.to_string_lossy();
    let caps = SUFFIX.captures(&name)?;
    ArchiveFormat::from_token(&caps[1])
}

/// Stage 2: the format named in a file-type detector description such as
/// `Zip archive data, at least v2.0 to extract`.
pub fn format_from_description(description: &str) -> Option<ArchiveFormat> {
    let caps = DESCRIPTION.captures(description)?;
    ArchiveFormat::from_token(&caps[1])
}

/// Runs both sniffing stages against `file`, invoking `detector -b <file>`
/// only when the suffix is not recognised.
pub async fn sniff_format<R>(runner: &R, detector: &Path, file: &Path) -> Option<ArchiveFormat>
where
    R: CommandRunner + ?Sized,
{
    if let Some(format) = format_from_suffix(file) {
        info!(file = %file.display(), %format, "Archive format taken from file name");
        return Some(format);
    }

    let cwd = file.parent().unwrap_or_else(|| Path::new("."));
    let invocation = Invocation::new(detector, cwd).arg("-b").arg(file);
    let output = match runner.run(&invocation).await {
        Ok(output) if output.is_success() => output,
        Ok(output) => {
            warn!(command = %invocation, code = ?output.code, "File-type detector exited unsuccessfully");
            return None;
        }
        Err(e) => {
            warn!(error = %e, command = %invocation, "Could not run file-type detector");
            return None;
        }
    };

    let description = output.stdout.trim();
    debug!(file = %file.display(), description, "File-type detector output");
    match format_from_description(description) {
        Some(format) => {
            info!(file = %file.display(), %format, "Archive format taken from file-type detector");
            Some(format)
        }
        None => {
            warn!(file = %file.display(), description, "File is not a recognised archive");
            None
        }
    }
}
