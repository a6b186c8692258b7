//! The per-run scratch directory.
//!
//! A [`WorkDir`] is owned by exactly one run. It ends in one of two ways:
//! [`WorkDir::remove`] after a fully successful run, or [`WorkDir::retain`]
//! when something failed and the contents are left for manual inspection.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, info};

#[derive(Debug)]
pub struct WorkDir {
    inner: TempDir,
}

impl WorkDir {
    /// Creates a uniquely named directory `root/<prefix>XXXXXX`, creating
    /// `root` first if needed.
    pub fn create(root: &Path, prefix: &str) -> io::Result<Self> {
        fs::create_dir_all(root)?;
        let inner = tempfile::Builder::new().prefix(prefix).tempdir_in(root)?;
        debug!(path = %inner.path().display(), "Created work directory");
        Ok(Self { inner })
    }

    pub fn path(&self) -> &Path {
        self.inner.path()
    }

    /// Leaves the directory and its contents on disk and returns its path.
    pub fn retain(self) -> PathBuf {
        let path = self.inner.keep();
        info!(path = %path.display(), "Work directory kept for inspection");
        path
    }

    /// Deletes the directory and everything in it.
    pub fn remove(self) -> io::Result<()> {
        let path = self.inner.path().to_path_buf();
        self.inner.close()?;
        info!(path = %path.display(), "Removed work directory");
        Ok(())
    }
}
