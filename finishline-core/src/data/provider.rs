//! Results sources and structured data errors.
//!
//! A results file is either on disk or behind an http(s) URL. Providers only
//! fetch raw bytes; decoding and parsing live in [`super::ingest`], so a bad
//! byte costs one record rather than the whole file.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

/// Errors from fetching or parsing a results file.
///
/// Displayable as-is in both CLI and TUI.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("network error: {0}")]
    Network(String),

    #[error("results file is missing required columns: {}", .0.join(", "))]
    MissingColumn(Vec<String>),

    #[error("no usable result rows in {0}")]
    Empty(String),
}

/// Where the results table comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    Url(String),
}

impl DataSource {
    /// `http://` / `https://` prefixes select a URL; anything else is a path.
    pub fn parse(spec: &str) -> Self {
        let trimmed = spec.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            DataSource::Url(trimmed.to_string())
        } else {
            DataSource::File(PathBuf::from(trimmed))
        }
    }

    /// Provider able to fetch this source.
    pub fn provider(&self) -> Result<Box<dyn ResultsProvider>, DataError> {
        Ok(match self {
            DataSource::File(path) => Box::new(FileProvider::new(path)),
            DataSource::Url(url) => Box::new(HttpProvider::new(url)?),
        })
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::File(path) => write!(f, "{}", path.display()),
            DataSource::Url(url) => f.write_str(url),
        }
    }
}

/// Fetches the raw CSV bytes of one results source.
pub trait ResultsProvider {
    fn name(&self) -> &str;

    fn fetch(&self) -> Result<Vec<u8>, DataError>;
}

pub struct FileProvider {
    path: PathBuf,
    name: String,
}

impl FileProvider {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            name: path.display().to_string(),
        }
    }
}

impl ResultsProvider for FileProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> Result<Vec<u8>, DataError> {
        std::fs::read(&self.path).map_err(|source| DataError::Io {
            path: self.name.clone(),
            source,
        })
    }
}

/// Blocking HTTP GET with a short exponential backoff on transient failures.
pub struct HttpProvider {
    client: reqwest::blocking::Client,
    url: String,
    max_retries: u32,
    base_delay: Duration,
}

impl HttpProvider {
    pub fn new(url: &str) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("finishline/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DataError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.to_string(),
            max_retries: 2,
            base_delay: Duration::from_millis(500),
        })
    }
}

impl ResultsProvider for HttpProvider {
    fn name(&self) -> &str {
        &self.url
    }

    fn fetch(&self) -> Result<Vec<u8>, DataError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                debug!(attempt, ?delay, url = %self.url, "retrying results download");
                std::thread::sleep(delay);
            }

            match self.client.get(&self.url).send() {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        warn!(%status, url = %self.url, "transient HTTP failure");
                        last_error = Some(DataError::Network(format!("HTTP {status} for {}", self.url)));
                        continue;
                    }
                    if !status.is_success() {
                        return Err(DataError::Network(format!("HTTP {status} for {}", self.url)));
                    }
                    return resp
                        .bytes()
                        .map(|body| body.to_vec())
                        .map_err(|e| DataError::Network(format!("failed to read body: {e}")));
                }
                Err(e) if e.is_connect() || e.is_timeout() => {
                    warn!(error = %e, url = %self.url, "results download failed");
                    last_error = Some(DataError::Network(e.to_string()));
                }
                Err(e) => return Err(DataError::Network(e.to_string())),
            }
        }

        Err(last_error.unwrap_or_else(|| DataError::Network("max retries exceeded".into())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_source_kind() {
        assert_eq!(
            DataSource::parse("https://example.com/results.csv"),
            DataSource::Url("https://example.com/results.csv".into())
        );
        assert_eq!(
            DataSource::parse(" HTTP://host/x.csv "),
            DataSource::Url("HTTP://host/x.csv".into())
        );
        assert_eq!(
            DataSource::parse("data/results.csv"),
            DataSource::File(PathBuf::from("data/results.csv"))
        );
    }

    #[test]
    fn missing_file_is_io_error() {
        let provider = FileProvider::new(Path::new("/nonexistent/results.csv"));
        assert!(matches!(provider.fetch(), Err(DataError::Io { .. })));
        assert_eq!(provider.name(), "/nonexistent/results.csv");
    }

    #[test]
    fn missing_column_message_lists_names() {
        let err = DataError::MissingColumn(vec!["Chip Time".into(), "event_type".into()]);
        assert_eq!(
            err.to_string(),
            "results file is missing required columns: Chip Time, event_type"
        );
    }
}
