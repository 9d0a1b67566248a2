use std::path::Path;
use std::time::Duration;

use encoding_rs::Encoding;
use reqwest::blocking::Client;
use tracing::{debug, warn};

use crate::error::{IngestError, Result};
use crate::models::Table;
use crate::utils::constants::{DOWNLOAD_TIMEOUT_SECS, FEED_DELIMITER};

/// Retrieves the semicolon-delimited SMN source files: the observation feed
/// over HTTP(S) and the parameter metadata from disk.
pub struct CsvSource {
    timeout: Duration,
    accept_invalid_certs: bool,
}

impl CsvSource {
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(DOWNLOAD_TIMEOUT_SECS),
            accept_invalid_certs: false,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Skip TLS certificate verification on the fetch. Off by default; the
    /// upstream host has served certificates some trust stores reject, so
    /// this is exposed as an explicit opt-in rather than hardcoded.
    pub fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Download a CSV resource and parse it into a table.
    ///
    /// A connection failure or timeout surfaces as a transport error, a
    /// non-success status as an HTTP status error. No retries.
    pub fn fetch_remote_csv(&self, url: &str) -> Result<Table> {
        let client = Client::builder()
            .timeout(self.timeout)
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .build()?;

        let response = client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text()?;
        debug!(url, bytes = body.len(), "downloaded source feed");

        Table::from_delimited_reader(body.as_bytes(), FEED_DELIMITER)
    }

    /// Read a CSV file from disk with a caller-specified text encoding
    /// (the parameter metadata file is latin1, not UTF-8).
    pub fn read_local_csv(&self, path: &Path, encoding_label: &str) -> Result<Table> {
        let encoding = Encoding::for_label(encoding_label.as_bytes())
            .ok_or_else(|| IngestError::UnknownEncoding(encoding_label.to_string()))?;

        let bytes = std::fs::read(path)?;
        let (text, _, had_errors) = encoding.decode(&bytes);
        if had_errors {
            warn!(
                path = %path.display(),
                encoding = encoding_label,
                "malformed bytes in metadata file, decoded lossily"
            );
        }

        Table::from_delimited_reader(text.as_bytes(), FEED_DELIMITER)
    }
}

impl Default for CsvSource {
    fn default() -> Self {
        Self::new()
    }
}
