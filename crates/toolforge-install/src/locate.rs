//! Artifact candidate selection
//!
//! Produces the ranked list of downloadable artifacts for one tool,
//! version, and architecture. Tools with deterministic naming get
//! their filename templates interpolated; tools publishing via a
//! release-listing API get their advertised asset names filtered for
//! platform compatibility and ranked.

use serde::Deserialize;
use tracing::{debug, warn};

use toolforge_core::{
    Architecture, InstallError, NamingStrategy, RenderContext, Result, ToolSpec,
};

use crate::fetch::Fetcher;
use crate::version::ResolvedVersion;

/// One downloadable artifact, in preference order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactCandidate {
    /// Artifact filename (used for checksum manifest correlation)
    pub filename: String,

    /// Full download URL
    pub url: String,
}

/// Release information from a release-listing API
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    /// Release tag (e.g., "v2.12.0")
    pub tag_name: String,

    /// Advertised release assets
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// One advertised release asset
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    /// Asset filename
    pub name: String,

    /// Download URL
    pub browser_download_url: String,
}

/// Name fragments that mark an asset as unusable on linux/amd64|arm64,
/// or as a side-file rather than an artifact
const REJECT_TOKENS: &[&str] = &[
    "windows", "darwin", "macos", "freebsd", "openbsd", "solaris", ".exe", ".zip", ".msi",
    ".sha256", ".sha512", ".sig", ".asc", ".pem", ".txt", ".json", ".sbom", ".spdx", "checksums",
    "s390x", "ppc64le", "386", "i686", "armv6", "armv7", "riscv64", "-src", "source",
];

/// Locates release artifacts for a tool
pub struct ArtifactLocator<'a> {
    fetcher: &'a Fetcher,
}

impl<'a> ArtifactLocator<'a> {
    pub fn new(fetcher: &'a Fetcher) -> Self {
        Self { fetcher }
    }

    /// Produce the ranked candidate list for a tool at a version
    pub async fn locate(
        &self,
        tool: &ToolSpec,
        version: &ResolvedVersion,
        arch: Architecture,
    ) -> Result<Vec<ArtifactCandidate>> {
        let ctx = RenderContext::for_version(&version.tag, arch);

        let candidates = match &tool.naming {
            NamingStrategy::Deterministic {
                base_url,
                filenames,
            } => {
                let base = ctx.render(base_url);
                filenames
                    .iter()
                    .map(|template| {
                        let filename = ctx.render(template);
                        let url = format!("{}/{}", base.trim_end_matches('/'), filename);
                        ArtifactCandidate { filename, url }
                    })
                    .collect::<Vec<_>>()
            }

            NamingStrategy::ReleaseAssets { release_url } => {
                let url = ctx.render(release_url);
                let body = self.fetcher.fetch_text(&url).await?;
                let release: Release = serde_json::from_str(&body).map_err(|e| {
                    InstallError::network(&url, format!("invalid release listing: {}", e))
                })?;
                if !version.matches(&release.tag_name) {
                    warn!(
                        "{}: release listing reports tag {}, expected {}",
                        tool.id, release.tag_name, version.tag
                    );
                }
                select_assets(&release.assets, arch)
            }
        };

        if candidates.is_empty() {
            return Err(InstallError::no_compatible_artifact(
                &tool.id,
                arch.token(),
                "no artifact survived platform filtering",
            ));
        }

        debug!(
            "{}: {} candidate(s), first is {}",
            tool.id,
            candidates.len(),
            candidates[0].filename
        );
        Ok(candidates)
    }
}

/// Filter and rank advertised assets for an architecture
///
/// Rejected outright: non-Linux OS tokens, unsupported CPU families,
/// checksum/signature side-files, and the opposite supported
/// architecture. Survivors are ranked: on amd64 a generic
/// non-arch-qualified name wins, then names carrying the matching arch
/// token, with lexicographically greater names first as the tiebreak.
pub fn select_assets(assets: &[ReleaseAsset], arch: Architecture) -> Vec<ArtifactCandidate> {
    let mut survivors: Vec<&ReleaseAsset> = assets
        .iter()
        .filter(|a| is_compatible(&a.name, arch))
        .collect();

    survivors.sort_by(|a, b| {
        rank(&a.name, arch)
            .cmp(&rank(&b.name, arch))
            .then_with(|| b.name.cmp(&a.name))
    });

    survivors
        .into_iter()
        .map(|a| ArtifactCandidate {
            filename: a.name.clone(),
            url: a.browser_download_url.clone(),
        })
        .collect()
}

/// Whether an asset name is usable on linux with the given architecture
pub fn is_compatible(name: &str, arch: Architecture) -> bool {
    let lower = name.to_ascii_lowercase();

    if REJECT_TOKENS.iter().any(|t| lower.contains(t)) {
        return false;
    }

    // The opposite supported architecture is incompatible too.
    if arch
        .opposite()
        .aliases()
        .iter()
        .any(|alias| lower.contains(alias))
    {
        return false;
    }

    true
}

fn rank(name: &str, arch: Architecture) -> u8 {
    let lower = name.to_ascii_lowercase();
    let has_arch_token = arch.aliases().iter().any(|alias| lower.contains(alias));

    match arch {
        // Generic builds are the published default on amd64.
        Architecture::Amd64 => {
            if has_arch_token {
                1
            } else {
                0
            }
        }
        Architecture::Arm64 => {
            if has_arch_token {
                0
            } else {
                1
            }
        }
    }
}
