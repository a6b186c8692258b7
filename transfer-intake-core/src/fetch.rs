use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use reqwest::header::CONTENT_DISPOSITION;
use tracing::{debug, error, info};

use crate::config::FetchConfig;
use crate::contract::{CommandRunner, Fetcher, Invocation};
use crate::error::FetchError;

static DISPOSITION_FILENAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)filename(\*)?\s*=\s*(?:UTF-8'[^']*')?"?([^";]+)"?"#)
        .expect("static filename pattern")
});

const FALLBACK_FILE_NAME: &str = "download.bin";

/// Returns the only entry of `dir`, failing when it is empty or holds more
/// than one entry.
pub fn sole_entry(dir: &Path) -> Result<PathBuf, FetchError> {
    let mut entries = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()?;
    match entries.len() {
        0 => Err(FetchError::NoFile),
        1 => Ok(entries.remove(0)),
        count => Err(FetchError::MultipleFiles { count }),
    }
}

/// Fetches by running an external retrieval helper inside the work directory.
pub struct HelperFetcher<R> {
    program: PathBuf,
    runner: R,
}

impl<R> HelperFetcher<R> {
    pub fn new(program: impl Into<PathBuf>, runner: R) -> Self {
        Self {
            program: program.into(),
            runner,
        }
    }
}

#[async_trait::async_trait]
impl<R: CommandRunner> Fetcher for HelperFetcher<R> {
    async fn fetch(&self, url: &str, dest_dir: &Path) -> Result<PathBuf, FetchError> {
        let invocation = Invocation::new(&self.program, dest_dir).arg(url);

        match self.runner.run(&invocation).await {
            Ok(output) if output.is_success() => {
                info!(
                    url = url,
                    helper = %self.program.display(),
                    dest_dir = %dest_dir.display(),
                    "Retrieval helper finished"
                );
            }
            Ok(output) => {
                error!(
                    url = url,
                    helper = %self.program.display(),
                    code = ?output.code,
                    "Retrieval helper exited with non-zero code"
                );
                return Err(FetchError::HelperExited { code: output.code });
            }
            Err(e) => {
                error!(
                    error = %e,
                    url = url,
                    helper = %self.program.display(),
                    "Failed to launch retrieval helper"
                );
                return Err(e.into());
            }
        }

        let file = sole_entry(dest_dir).map_err(|e| {
            error!(error = %e, dest_dir = %dest_dir.display(), "Unexpected work directory contents after fetch");
            e
        })?;
        info!(file = %file.display(), "Fetched file");
        Ok(file)
    }
}

/// Fetches with a plain HTTP GET.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client })
    }

    /// Uses a preconfigured client, e.g. one with proxies or timeouts set.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, dest_dir: &Path) -> Result<PathBuf, FetchError> {
        info!(url = url, "Fetching over HTTP");
        let response = self.client.get(url).send().await.map_err(|e| {
            error!(error = ?e, url = url, "HTTP request failed");
            FetchError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            error!(status = %status, url = url, "HTTP download returned error status");
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let name = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(filename_from_disposition)
            .or_else(|| filename_from_url_path(response.url().path()))
            .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string());

        let body = response.bytes().await?;
        let path = dest_dir.join(&name);
        tokio::fs::write(&path, &body).await?;
        debug!(file = %path.display(), size = body.len(), "Wrote HTTP response body");

        sole_entry(dest_dir)
    }
}

/// File name from a `Content-Disposition` header value, reduced to its last
/// path component.
pub fn filename_from_disposition(value: &str) -> Option<String> {
    let caps = DISPOSITION_FILENAME.captures(value)?;
    let raw = caps[2].trim();
    // filename* values are percent-encoded (RFC 5987)
    if caps.get(1).is_some() {
        if let Ok(decoded) = urlencoding::decode(raw) {
            return safe_file_name(&decoded);
        }
    }
    safe_file_name(raw)
}

/// Last non-empty segment of a URL path.
pub fn filename_from_url_path(path: &str) -> Option<String> {
    path.rsplit('/')
        .find(|segment| !segment.is_empty())
        .and_then(safe_file_name)
}

fn safe_file_name(candidate: &str) -> Option<String> {
    let name = Path::new(candidate).file_name()?.to_string_lossy().into_owned();
    if name.is_empty() || name == "." || name == ".." {
        None
    } else {
        Some(name)
    }
}

/// The fetcher selected by [`FetchConfig`].
pub enum DefaultFetcher<R> {
    Helper(HelperFetcher<R>),
    Http(HttpFetcher),
}

impl<R> DefaultFetcher<R> {
    pub fn from_config(config: &FetchConfig, runner: R) -> Result<Self, FetchError> {
        match config {
            FetchConfig::Helper { program } => {
                Ok(DefaultFetcher::Helper(HelperFetcher::new(program, runner)))
            }
            FetchConfig::Http => Ok(DefaultFetcher::Http(HttpFetcher::new()?)),
        }
    }
}

#[async_trait::async_trait]
impl<R: CommandRunner> Fetcher for DefaultFetcher<R> {
    async fn fetch(&self, url: &str, dest_dir: &Path) -> Result<PathBuf, FetchError> {
        match self {
            DefaultFetcher::Helper(fetcher) => fetcher.fetch(url, dest_dir).await,
            DefaultFetcher::Http(fetcher) => fetcher.fetch(url, dest_dir).await,
        }
    }
}
