//! HTTP fetching with streaming SHA256 digests
//!
//! Downloads are streamed to disk in bounded chunks while a cumulative
//! hash runs over the byte stream, so artifacts are never buffered in
//! memory for hashing. One request per call; retries, if any, happen
//! across artifact candidates at the transaction layer.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::CONTENT_LENGTH;
use sha2::{Digest, Sha256};
use tracing::debug;

use toolforge_core::{InstallError, Result};

/// Chunk size for hashing local files (1MB)
const HASH_CHUNK_SIZE: usize = 1024 * 1024;

/// Default per-request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// HTTP fetcher shared by all installer components
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    /// Create a fetcher with the default timeout
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a fetcher with an explicit per-request timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!("toolforge/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| InstallError::network("<client>", e.to_string()))?;

        Ok(Self { client })
    }

    /// Fetch a URL and return its body as text
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        debug!("Fetching text: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| InstallError::network(url, e.to_string()))?;

        if !response.status().is_success() {
            return Err(InstallError::network(
                url,
                format!("HTTP {}", response.status()),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| InstallError::network(url, e.to_string()))
    }

    /// Stream a URL to a local file, returning the SHA256 hex digest
    /// of the full byte stream
    pub async fn fetch_to_file(&self, url: &str, dest: &Path) -> Result<String> {
        debug!("Downloading {} -> {:?}", url, dest);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| InstallError::network(url, e.to_string()))?;

        if !response.status().is_success() {
            return Err(InstallError::network(
                url,
                format!("HTTP {}", response.status()),
            ));
        }

        let expected_len = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        let mut file = File::create(dest)?;
        let mut hasher = Sha256::new();
        let mut written: u64 = 0;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk: bytes::Bytes =
                chunk.map_err(|e| InstallError::network(url, e.to_string()))?;
            hasher.update(&chunk);
            file.write_all(&chunk)?;
            written += chunk.len() as u64;
        }
        file.flush()?;

        if let Some(expected) = expected_len {
            if written != expected {
                return Err(InstallError::network(
                    url,
                    format!("truncated transfer: expected {} bytes, got {}", expected, written),
                ));
            }
        }

        Ok(hex::encode(hasher.finalize()))
    }

    /// Compute the SHA256 hex digest of a local file
    pub fn digest_of(path: &Path) -> Result<String> {
        let mut file = File::open(path)?;
        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; HASH_CHUNK_SIZE];

        loop {
            let bytes_read = file.read(&mut buffer)?;
            if bytes_read == 0 {
                break;
            }
            hasher.update(&buffer[..bytes_read]);
        }

        Ok(hex::encode(hasher.finalize()))
    }
}
