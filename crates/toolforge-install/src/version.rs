//! Version resolution against upstream sources
//!
//! Turns a desired version ("latest" or an explicit pin) into the
//! normalized tag the artifact locator interpolates into URLs. Latest
//! lookups never mutate external state; pins resolve with zero network
//! requests.

use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info, warn};

use toolforge_core::{InstallError, Result, ToolSpec, VersionRequest, VersionSource};

use crate::fetch::Fetcher;

/// Where a resolved version came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionProvenance {
    /// Explicitly pinned by configuration
    Pinned,
    /// Resolved from the tool's upstream version source
    Resolved,
}

/// A normalized, comparable version identifier
#[derive(Debug, Clone)]
pub struct ResolvedVersion {
    /// Normalized tag in the tool's expected style (e.g., "v1.30.0")
    pub tag: String,

    /// Pin vs. oracle-resolved
    pub source: VersionProvenance,
}

impl ResolvedVersion {
    /// The tag without its leading `v`, for prefix-insensitive
    /// comparison
    pub fn normalized(&self) -> &str {
        self.tag.strip_prefix('v').unwrap_or(&self.tag)
    }

    /// Whether another version string denotes the same version
    pub fn matches(&self, other: &str) -> bool {
        self.normalized() == other.strip_prefix('v').unwrap_or(other)
    }
}

impl PartialEq for ResolvedVersion {
    fn eq(&self, other: &Self) -> bool {
        self.normalized() == other.normalized()
    }
}

impl std::fmt::Display for ResolvedVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag)
    }
}

/// Minimal release-listing payload: only the tag is needed here
#[derive(Debug, Deserialize)]
struct LatestRelease {
    tag_name: String,
}

/// Resolves desired versions against each tool's upstream source
pub struct VersionOracle<'a> {
    fetcher: &'a Fetcher,
}

impl<'a> VersionOracle<'a> {
    pub fn new(fetcher: &'a Fetcher) -> Self {
        Self { fetcher }
    }

    /// Resolve a tool's desired version
    pub async fn resolve(
        &self,
        tool: &ToolSpec,
        request: &VersionRequest,
    ) -> Result<ResolvedVersion> {
        match request {
            VersionRequest::Pin(version) => Ok(ResolvedVersion {
                tag: tool.tag_style.normalize(version),
                source: VersionProvenance::Pinned,
            }),
            VersionRequest::Latest => {
                let tag = self.resolve_latest(tool).await?;
                Ok(ResolvedVersion {
                    tag: tool.tag_style.normalize(&tag),
                    source: VersionProvenance::Resolved,
                })
            }
        }
    }

    async fn resolve_latest(&self, tool: &ToolSpec) -> Result<String> {
        match &tool.version_source {
            VersionSource::StableText { url } => {
                let body = self
                    .fetcher
                    .fetch_text(url)
                    .await
                    .map_err(|e| InstallError::version_resolution(&tool.id, e.to_string()))?;
                let tag = body.trim().to_string();
                if tag.is_empty() {
                    return Err(InstallError::version_resolution(
                        &tool.id,
                        format!("empty response from {}", url),
                    ));
                }
                debug!("{}: stable endpoint reports {}", tool.id, tag);
                Ok(tag)
            }

            VersionSource::ReleaseLatest { url } => {
                let body = self
                    .fetcher
                    .fetch_text(url)
                    .await
                    .map_err(|e| InstallError::version_resolution(&tool.id, e.to_string()))?;
                let release: LatestRelease = serde_json::from_str(&body).map_err(|e| {
                    InstallError::version_resolution(
                        &tool.id,
                        format!("invalid release listing from {}: {}", url, e),
                    )
                })?;
                debug!("{}: latest release tag {}", tool.id, release.tag_name);
                Ok(release.tag_name)
            }

            VersionSource::DocScan {
                pages,
                pattern,
                fallback,
            } => {
                let re = Regex::new(pattern).map_err(|e| {
                    InstallError::version_resolution(
                        &tool.id,
                        format!("invalid version pattern: {}", e),
                    )
                })?;

                for page in pages {
                    match self.fetcher.fetch_text(page).await {
                        Ok(body) => {
                            if let Some(caps) = re.captures(&body) {
                                if let Some(m) = caps.get(1) {
                                    info!("{}: found version {} on {}", tool.id, m.as_str(), page);
                                    return Ok(m.as_str().to_string());
                                }
                            }
                            debug!("{}: no version token on {}", tool.id, page);
                        }
                        Err(e) => debug!("{}: page scan failed for {}: {}", tool.id, page, e),
                    }
                }

                warn!(
                    "{}: every version page failed, using last known good {}",
                    tool.id, fallback
                );
                Ok(fallback.clone())
            }
        }
    }
}
