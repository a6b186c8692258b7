use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::link::DEFAULT_LINK_PREFIX;

/// Everything a run needs to know about its environment. Every key is
/// optional when deserialising; missing keys take the built-in defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    /// Directory under which per-run work directories are created.
    pub work_root: PathBuf,
    /// Name prefix of each per-run work directory.
    pub work_prefix: String,
    /// Literal prefix a download link starts with.
    pub link_prefix: String,
    /// Keep the work directory even when every stage succeeded.
    pub keep_work_dir: bool,
    pub fetch: FetchConfig,
    pub tools: ToolPaths,
    /// Downstream scripts, run in order against the extraction directory.
    pub post_processors: Vec<PathBuf>,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            work_root: std::env::temp_dir(),
            work_prefix: "intake".to_string(),
            link_prefix: DEFAULT_LINK_PREFIX.to_string(),
            keep_work_dir: false,
            fetch: FetchConfig::default(),
            tools: ToolPaths::default(),
            post_processors: vec![
                PathBuf::from("/SG/code/process_incoming_files.R"),
                PathBuf::from("/SG/code/motusIncomingFiles.R"),
            ],
        }
    }
}

impl IntakeConfig {
    pub fn trace_loaded(&self) {
        info!(
            work_root = %self.work_root.display(),
            link_prefix = %self.link_prefix,
            post_processors = self.post_processors.len(),
            "Loaded IntakeConfig"
        );
        debug!(?self, "IntakeConfig loaded (full debug)");
    }
}

/// How the download link is turned into a file on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum FetchConfig {
    /// Run an external retrieval helper with the URL as its only argument.
    Helper {
        #[serde(default = "default_helper")]
        program: PathBuf,
    },
    /// Plain HTTP GET of the URL.
    Http,
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig::Helper {
            program: default_helper(),
        }
    }
}

fn default_helper() -> PathBuf {
    PathBuf::from("/SG/code/getWeTransferFile.R")
}

/// Locations of the archive tools and the file-type detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    pub unzip: PathBuf,
    pub seven_zip: PathBuf,
    pub unrar: PathBuf,
    pub file: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            unzip: PathBuf::from("unzip"),
            seven_zip: PathBuf::from("7z"),
            unrar: PathBuf::from("unrar"),
            file: PathBuf::from("file"),
        }
    }
}
