//! High-level pipeline: message → link → fetch → sniff → extract → post-process.
//!
//! [`process_message`] runs every stage in order for one message and stops at
//! the first failure. Stages never share ambient process state: the work
//! directory is passed explicitly to each of them.
//!
//! # Cleanup
//! The work directory is removed only after every post-processor succeeded.
//! Every failure from the fetch stage onward keeps it on disk and reports its
//! path through [`IntakeError::retained_dir`].

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::IntakeConfig;
use crate::contract::{CommandRunner, Fetcher};
use crate::error::IntakeError;
use crate::extract::extract_archive;
use crate::link::find_download_link;
use crate::message::{extract_body, load_message};
use crate::postprocess::run_post_processors;
use crate::sniff::{sniff_format, ArchiveFormat};
use crate::workdir::WorkDir;

/// What a successful run did.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub message: PathBuf,
    pub url: String,
    pub archive: PathBuf,
    pub format: ArchiveFormat,
    pub work_dir: PathBuf,
    pub post_processors: Vec<PathBuf>,
    /// False when the directory was kept by configuration or could not be deleted.
    pub work_dir_removed: bool,
}

pub async fn process_message<F, R>(
    config: &IntakeConfig,
    fetcher: &F,
    runner: &R,
    message_path: &Path,
) -> Result<RunReport, IntakeError>
where
    F: Fetcher + ?Sized,
    R: CommandRunner + ?Sized,
{
    info!(message = %message_path.display(), "Starting intake");

    // --- Step 1: Message body ---
    let raw = load_message(message_path).await?;
    let body = extract_body(&raw).map_err(|e| {
        error!(error = %e, "Failed to parse message");
        IntakeError::from(e)
    })?;
    let body = String::from_utf8_lossy(&body);

    // --- Step 2: Download link ---
    let url = match find_download_link(&body, &config.link_prefix) {
        Some(url) => url.to_owned(),
        None => {
            warn!(prefix = %config.link_prefix, body_len = body.len(), "No download link in message body");
            return Err(IntakeError::NoLinkFound);
        }
    };
    info!(url = %url, "Found download link");

    // --- Step 3: Fetch into a fresh work directory ---
    let work = WorkDir::create(&config.work_root, &config.work_prefix).map_err(|source| {
        error!(error = ?source, root = %config.work_root.display(), "Failed to create work directory");
        IntakeError::WorkDir {
            root: config.work_root.clone(),
            source,
        }
    })?;

    let archive = match fetcher.fetch(&url, work.path()).await {
        Ok(archive) => archive,
        Err(source) => {
            error!(error = %source, url = %url, "Fetch failed");
            return Err(IntakeError::FetchFailed {
                dir: work.retain(),
                source,
            });
        }
    };

    // --- Step 4: Sniff ---
    let Some(format) = sniff_format(runner, &config.tools.file, &archive).await else {
        error!(file = %archive.display(), "Unrecognised archive format, not extracting");
        return Err(IntakeError::UnknownFormat {
            dir: work.retain(),
            file: archive,
        });
    };

    // --- Step 5: Extract ---
    if let Err(source) =
        extract_archive(runner, &config.tools, format, &archive, work.path()).await
    {
        return Err(IntakeError::ExtractionFailed {
            dir: work.retain(),
            format,
            source,
        });
    }

    // --- Step 6: Post-process ---
    let post_processors =
        match run_post_processors(runner, &config.post_processors, work.path()).await {
            Ok(ran) => ran,
            Err(failure) => {
                return Err(IntakeError::PostProcessingFailed {
                    dir: work.retain(),
                    script: failure.script,
                    source: failure.source,
                });
            }
        };

    // --- Step 7: Cleanup ---
    let work_dir = work.path().to_path_buf();
    let work_dir_removed = if config.keep_work_dir {
        work.retain();
        false
    } else {
        match work.remove() {
            Ok(()) => true,
            Err(e) => {
                warn!(error = ?e, path = %work_dir.display(), "Failed to remove work directory");
                false
            }
        }
    };

    let report = RunReport {
        message: message_path.to_path_buf(),
        url,
        archive,
        format,
        work_dir,
        post_processors,
        work_dir_removed,
    };
    match serde_json::to_string_pretty(&report) {
        Ok(json) => debug!(json = %json, "Run report"),
        Err(e) => error!(error = ?e, "Failed to serialize run report"),
    }
    info!(url = %report.url, %format, "Intake complete");
    Ok(report)
}
