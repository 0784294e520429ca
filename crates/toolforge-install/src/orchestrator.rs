//! Sequential orchestration over the tool catalog
//!
//! Transactions run one at a time in catalog order; the destination
//! directory is shared mutable state and serialization is what keeps
//! it consistent. A required tool's failure aborts the remaining run,
//! best-effort failures are recorded and skipped past.

use std::path::PathBuf;

use tracing::{error, info, warn};

use toolforge_core::{default_catalog, Architecture, InstallerConfig, Result, ToolSpec};

use crate::fetch::Fetcher;
use crate::transaction::{InstallOutcome, InstallTransaction};

/// Outcome of one tool within a run
#[derive(Debug)]
pub struct ToolReport {
    /// Tool id
    pub id: String,

    /// Human-readable name
    pub display_name: String,

    /// Destination path for the tool's binary
    pub path: PathBuf,

    /// Whether a failure of this tool aborts the run
    pub required: bool,

    /// Terminal transaction state
    pub outcome: InstallOutcome,
}

/// Summary of a whole installer run
#[derive(Debug, Default)]
pub struct InstallReport {
    /// Per-tool outcomes, in execution order
    pub tools: Vec<ToolReport>,

    /// Id of the required tool whose failure aborted the run, if any
    pub aborted_by: Option<String>,
}

impl InstallReport {
    /// Whether the run completed without a fatal failure
    pub fn success(&self) -> bool {
        self.aborted_by.is_none()
            && self
                .tools
                .iter()
                .all(|t| !(t.required && t.outcome.is_failure()))
    }
}

/// Runs install transactions over the full tool set
pub struct InstallerOrchestrator {
    config: InstallerConfig,
    catalog: Vec<ToolSpec>,
    fetcher: Fetcher,
    arch: Architecture,
}

impl InstallerOrchestrator {
    /// Create an orchestrator over the default catalog
    pub fn new(config: InstallerConfig) -> Result<Self> {
        Self::with_catalog(config, default_catalog())
    }

    /// Create an orchestrator over an explicit catalog
    pub fn with_catalog(config: InstallerConfig, catalog: Vec<ToolSpec>) -> Result<Self> {
        Ok(Self {
            config,
            catalog,
            fetcher: Fetcher::new()?,
            // Exactly one architecture per run.
            arch: Architecture::detect(),
        })
    }

    /// Override the detected architecture
    pub fn with_arch(mut self, arch: Architecture) -> Self {
        self.arch = arch;
        self
    }

    /// Run transactions sequentially and collect the summary
    pub async fn run(&self) -> InstallReport {
        let mut report = InstallReport::default();
        let transaction = InstallTransaction::new(&self.fetcher, &self.config, self.arch);

        info!(
            "Installing {} tool(s) into {:?} ({})",
            self.catalog
                .iter()
                .filter(|t| self.config.includes(t))
                .count(),
            self.config.dest_dir,
            self.arch
        );

        for tool in &self.catalog {
            if !self.config.includes(tool) {
                continue;
            }

            let outcome = transaction.install(tool).await;

            match &outcome {
                InstallOutcome::Skipped { version } => {
                    info!("{}: up to date ({})", tool.id, version)
                }
                InstallOutcome::Installed { version, .. } => {
                    info!("{}: installed {}", tool.id, version)
                }
                InstallOutcome::Failed { error } if tool.required => {
                    error!("{}: {}", tool.id, error)
                }
                InstallOutcome::Failed { error } => {
                    warn!("{}: {} (best-effort, continuing)", tool.id, error)
                }
            }

            let fatal = tool.required && outcome.is_failure();

            report.tools.push(ToolReport {
                id: tool.id.clone(),
                display_name: tool.display_name.clone(),
                path: self.config.dest_dir.join(&tool.bin_name),
                required: tool.required,
                outcome,
            });

            if fatal {
                report.aborted_by = Some(tool.id.clone());
                error!("Aborting run: required tool {} failed", tool.id);
                break;
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolforge_core::InstallError;

    fn failed_report(id: &str, required: bool) -> ToolReport {
        ToolReport {
            id: id.to_string(),
            display_name: id.to_string(),
            path: PathBuf::from("/tmp"),
            required,
            outcome: InstallOutcome::Failed {
                error: InstallError::checksum_unavailable(id),
            },
        }
    }

    #[test]
    fn test_report_success_with_best_effort_failure() {
        let report = InstallReport {
            tools: vec![failed_report("roxctl", false)],
            aborted_by: None,
        };
        assert!(report.success());
    }

    #[test]
    fn test_report_failure_on_required_tool() {
        let report = InstallReport {
            tools: vec![failed_report("kubectl", true)],
            aborted_by: Some("kubectl".to_string()),
        };
        assert!(!report.success());
    }
}
