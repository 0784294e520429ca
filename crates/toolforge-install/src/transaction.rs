//! Per-tool install transaction
//!
//! Runs the locate -> fetch -> verify -> extract -> place pipeline for
//! one tool, with the idempotency short-circuit up front. All work
//! happens inside a scoped temp workspace that is removed on every
//! exit path; the destination file only changes at the final rename.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tempfile::TempDir;
use tracing::{debug, info, warn};

use toolforge_core::{
    Architecture, ChecksumPolicy, InstallError, InstallerConfig, RenderContext, Result, ToolSpec,
};

use crate::archive::{extract_tar_gz, find_binary};
use crate::checksum::ChecksumResolver;
use crate::fetch::Fetcher;
use crate::locate::{ArtifactCandidate, ArtifactLocator};
use crate::version::{ResolvedVersion, VersionOracle};

/// Terminal state of one tool's install transaction
#[derive(Debug)]
pub enum InstallOutcome {
    /// The installed binary already reports the desired version
    Skipped { version: String },

    /// Installed (or reinstalled) successfully
    Installed {
        version: String,
        path: PathBuf,
        /// False when no digest was available (best-effort tools only)
        verified: bool,
        /// False when the post-install smoke test failed
        smoke_ok: bool,
    },

    /// The transaction failed; the destination was left untouched
    Failed { error: InstallError },
}

impl InstallOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, InstallOutcome::Failed { .. })
    }
}

/// What is currently sitting in the destination directory for a tool
#[derive(Debug, Clone)]
pub struct InstalledState {
    /// Whether an executable exists at the destination path
    pub present: bool,

    /// Version reported by the binary, when it could be queried
    pub reported_version: Option<String>,
}

/// Installs one tool according to its spec
pub struct InstallTransaction<'a> {
    fetcher: &'a Fetcher,
    config: &'a InstallerConfig,
    arch: Architecture,
}

impl<'a> InstallTransaction<'a> {
    pub fn new(fetcher: &'a Fetcher, config: &'a InstallerConfig, arch: Architecture) -> Self {
        Self {
            fetcher,
            config,
            arch,
        }
    }

    /// Run the full pipeline for one tool
    ///
    /// Never returns an error: every failure is absorbed into
    /// [`InstallOutcome::Failed`].
    pub async fn install(&self, tool: &ToolSpec) -> InstallOutcome {
        match self.run(tool).await {
            Ok(outcome) => outcome,
            Err(error) => InstallOutcome::Failed { error },
        }
    }

    async fn run(&self, tool: &ToolSpec) -> Result<InstallOutcome> {
        let oracle = VersionOracle::new(self.fetcher);
        let request = self.config.version_request(tool);
        let version = oracle.resolve(tool, &request).await?;

        let dest_path = self.config.dest_dir.join(&tool.bin_name);

        if !self.config.force {
            let state = probe_installed(&dest_path, tool).await;
            if state.present {
                if let Some(reported) = &state.reported_version {
                    if version.matches(reported) {
                        info!("{} {} already installed, skipping", tool.id, version);
                        return Ok(InstallOutcome::Skipped {
                            version: version.tag.clone(),
                        });
                    }
                    debug!(
                        "{}: installed {} != desired {}, reinstalling",
                        tool.id, reported, version
                    );
                } else {
                    debug!("{}: installed binary unqueryable, reinstalling", tool.id);
                }
            }
        }

        let locator = ArtifactLocator::new(self.fetcher);
        let candidates = locator.locate(tool, &version, self.arch).await?;

        // Owned by this transaction; removed on every exit path.
        let workspace = TempDir::new()?;

        let (candidate, download_path, verified) = self
            .fetch_verified(tool, &version, &candidates, workspace.path())
            .await?;

        let binary = self.stage_binary(tool, &candidate, &download_path, workspace.path())?;

        self.place(&binary, &dest_path)?;
        info!("{} {} installed to {:?}", tool.id, version, dest_path);

        let smoke_ok = smoke_test(&dest_path, tool).await;
        if !smoke_ok {
            warn!(
                "{}: smoke test failed; binary kept (digest already verified)",
                tool.id
            );
        }

        Ok(InstallOutcome::Installed {
            version: version.tag.clone(),
            path: dest_path,
            verified,
            smoke_ok,
        })
    }

    /// Try candidates in order until one downloads and verifies
    ///
    /// A candidate without an obtainable digest cascades to the next
    /// when the tool requires verification; a digest mismatch is
    /// always terminal.
    async fn fetch_verified(
        &self,
        tool: &ToolSpec,
        version: &ResolvedVersion,
        candidates: &[ArtifactCandidate],
        workspace: &Path,
    ) -> Result<(ArtifactCandidate, PathBuf, bool)> {
        let resolver = ChecksumResolver::new(self.fetcher);
        let mut last_err: Option<InstallError> = None;

        for (index, candidate) in candidates.iter().enumerate() {
            let remaining = candidates.len() - index - 1;

            let ctx = RenderContext::for_version(&version.tag, self.arch)
                .with_artifact(&candidate.filename, &candidate.url);
            let sources: Vec<String> = tool
                .checksum_sources
                .iter()
                .map(|t| ctx.render(t))
                .collect();

            let expected = resolver.resolve(&sources, &candidate.filename).await;

            if expected.is_none() && tool.checksum_policy == ChecksumPolicy::Required {
                warn!(
                    "{}: no checksum found for {}, trying next candidate",
                    tool.id, candidate.filename
                );
                last_err = Some(InstallError::checksum_unavailable(&candidate.filename));
                continue;
            }

            if expected.is_none() {
                warn!(
                    "{}: no checksum published for {}, proceeding unverified",
                    tool.id, candidate.filename
                );
            }

            let download_path = workspace.join(&candidate.filename);
            info!("Downloading {}", candidate.url);
            let actual = match self.fetcher.fetch_to_file(&candidate.url, &download_path).await {
                Ok(digest) => digest,
                Err(e) if remaining > 0 => {
                    warn!("{}: download failed ({}), trying next candidate", tool.id, e);
                    last_err = Some(e);
                    continue;
                }
                Err(e) => return Err(e),
            };

            if let Some(expected) = &expected {
                if !actual.eq_ignore_ascii_case(expected) {
                    // Corruption or tampering; never cascade past this.
                    return Err(InstallError::checksum_mismatch(
                        &candidate.filename,
                        expected,
                        &actual,
                    ));
                }
                debug!("{}: digest verified ({})", tool.id, actual);
            }

            return Ok((candidate.clone(), download_path, expected.is_some()));
        }

        Err(last_err.unwrap_or_else(|| {
            InstallError::no_compatible_artifact(&tool.id, self.arch.token(), "no candidates")
        }))
    }

    /// Produce the binary to install, extracting archives when needed
    fn stage_binary(
        &self,
        tool: &ToolSpec,
        candidate: &ArtifactCandidate,
        download_path: &Path,
        workspace: &Path,
    ) -> Result<PathBuf> {
        if candidate.filename.ends_with(".tar.gz") || candidate.filename.ends_with(".tgz") {
            let extract_dir = workspace.join("extract");
            extract_tar_gz(download_path, &extract_dir)?;
            find_binary(&extract_dir, &tool.bin_name)
                .ok_or_else(|| InstallError::binary_not_found(&tool.bin_name, &candidate.filename))
        } else {
            Ok(download_path.to_path_buf())
        }
    }

    /// Atomically place the staged binary into the destination
    ///
    /// Staged next to the final path so the commit is a single rename
    /// on the same filesystem; a crash mid-install never leaves a
    /// half-written destination file.
    fn place(&self, binary: &Path, dest_path: &Path) -> Result<()> {
        let dest_dir = dest_path
            .parent()
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dest_dir)?;

        let staged = dest_dir.join(format!(
            ".{}.partial",
            dest_path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("toolforge")
        ));

        fs::copy(binary, &staged)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&staged, fs::Permissions::from_mode(0o755))?;
        }

        fs::rename(&staged, dest_path)?;
        Ok(())
    }
}

/// Read the current installed state for a tool, fresh every call
pub async fn probe_installed(dest_path: &Path, tool: &ToolSpec) -> InstalledState {
    let executable = is_executable(dest_path);
    if !executable {
        return InstalledState {
            present: false,
            reported_version: None,
        };
    }

    let reported_version = query_version(dest_path, &tool.version_args).await;
    InstalledState {
        present: true,
        reported_version,
    }
}

/// Run the binary's own version command and extract a version token
async fn query_version(path: &Path, args: &[String]) -> Option<String> {
    let output = tokio::process::Command::new(path)
        .args(args)
        .output()
        .await
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let text = String::from_utf8_lossy(&output.stdout);
    extract_version_token(&text).or_else(|| {
        let stderr = String::from_utf8_lossy(&output.stderr);
        extract_version_token(&stderr)
    })
}

/// First version-shaped token in a tool's version output
fn extract_version_token(text: &str) -> Option<String> {
    static VERSION_RE: OnceLock<Regex> = OnceLock::new();
    let re = VERSION_RE.get_or_init(|| {
        Regex::new(r"v?(\d+\.\d+\.\d+)").expect("version regex is valid")
    });
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Post-install smoke test: invoke the tool's own version command once
async fn smoke_test(path: &Path, tool: &ToolSpec) -> bool {
    match tokio::process::Command::new(path)
        .args(&tool.version_args)
        .output()
        .await
    {
        Ok(output) => output.status.success(),
        Err(e) => {
            debug!("{}: smoke test could not run: {}", tool.id, e);
            false
        }
    }
}

fn is_executable(path: &Path) -> bool {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => {
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                meta.permissions().mode() & 0o111 != 0
            }
            #[cfg(not(unix))]
            {
                true
            }
        }
        _ => false,
    }
}
