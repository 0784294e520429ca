//! Checksum manifest resolution
//!
//! Manifest URLs are tried in order; the first one that fetches wins
//! and later sources are never consulted. Two manifest shapes are
//! understood: a single bare 64-hex digest, and sha256sum-style
//! `<digest>  <filename>` lines (optionally with a `*` binary marker).
//!
//! A missing digest is reported as `None`, not an error; the caller's
//! checksum policy decides how severe that is.

use tracing::debug;

use crate::fetch::Fetcher;

/// Resolves expected digests from cascading manifest sources
pub struct ChecksumResolver<'a> {
    fetcher: &'a Fetcher,
}

impl<'a> ChecksumResolver<'a> {
    pub fn new(fetcher: &'a Fetcher) -> Self {
        Self { fetcher }
    }

    /// Fetch manifest sources in order and extract the digest for
    /// `target_filename` from the first source that responds
    pub async fn resolve(&self, sources: &[String], target_filename: &str) -> Option<String> {
        for url in sources {
            match self.fetcher.fetch_text(url).await {
                Ok(text) => {
                    debug!("Using checksum manifest: {}", url);
                    // First success wins; an uncorrelatable manifest is
                    // not an excuse to consult the next source.
                    return parse_manifest(&text, target_filename);
                }
                Err(e) => debug!("Checksum source unavailable ({}): {}", url, e),
            }
        }
        None
    }
}

/// Extract the expected digest for `target` from manifest text
pub fn parse_manifest(text: &str, target: &str) -> Option<String> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    // A single whitespace-free line is the digest for the one artifact
    // this manifest describes, whatever the target filename.
    if lines.len() == 1 && !lines[0].contains(char::is_whitespace) {
        return hex64_token(lines[0]);
    }

    for line in &lines {
        if line.contains(target) {
            if let Some(digest) = first_hex64(line) {
                return Some(digest);
            }
        }
    }

    // No line named the target; a one-line manifest still counts.
    if lines.len() == 1 {
        return first_hex64(lines[0]);
    }

    None
}

/// The first 64-hex token on a line, markers stripped
fn first_hex64(line: &str) -> Option<String> {
    line.split_whitespace().find_map(hex64_token)
}

fn hex64_token(token: &str) -> Option<String> {
    let token = token.trim_start_matches(['*', '\\']);
    if token.len() == 64 && token.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(token.to_string())
    } else {
        None
    }
}
