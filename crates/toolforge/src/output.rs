//! Terminal rendering for installer runs

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use toolforge_install::{InstallOutcome, ToolReport};

/// Render the summary line for one tool's outcome
pub fn outcome_line(tool: &ToolReport) -> String {
    match &tool.outcome {
        InstallOutcome::Skipped { version } => format!(
            "{} {} {} already up to date",
            style("=").blue().bold(),
            tool.id,
            version
        ),
        InstallOutcome::Installed {
            version,
            verified: true,
            ..
        } => format!(
            "{} {} {} -> {}",
            style("✓").green().bold(),
            tool.id,
            version,
            tool.path.display()
        ),
        InstallOutcome::Installed {
            version,
            verified: false,
            ..
        } => format!(
            "{} {} {} -> {} {}",
            style("⚠").yellow().bold(),
            tool.id,
            version,
            tool.path.display(),
            style("(unverified)").yellow()
        ),
        InstallOutcome::Failed { error } => format!(
            "{} {}: {}",
            style("✗").red().bold(),
            tool.id,
            error
        ),
    }
}

/// Print a section header
pub fn header(msg: &str) {
    println!("\n{}", style(msg).bold());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", style(key).dim(), value);
}

/// Print a warning message
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("⚠").yellow().bold(), msg);
}

/// Spinner shown while the orchestrator runs
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner:.cyan} {msg}").unwrap());
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(120));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use toolforge_core::InstallError;

    fn report(outcome: InstallOutcome) -> ToolReport {
        ToolReport {
            id: "kubectl".to_string(),
            display_name: "Kubernetes CLI".to_string(),
            path: PathBuf::from("/home/dev/.local/bin/kubectl"),
            required: true,
            outcome,
        }
    }

    #[test]
    fn test_outcome_line_installed_names_path() {
        let line = outcome_line(&report(InstallOutcome::Installed {
            version: "v1.30.0".to_string(),
            path: PathBuf::from("/home/dev/.local/bin/kubectl"),
            verified: true,
            smoke_ok: true,
        }));
        assert!(line.contains("kubectl"));
        assert!(line.contains("v1.30.0"));
        assert!(line.contains("/home/dev/.local/bin/kubectl"));
        assert!(!line.contains("unverified"));
    }

    #[test]
    fn test_outcome_line_marks_unverified_install() {
        let line = outcome_line(&report(InstallOutcome::Installed {
            version: "4.6.0".to_string(),
            path: PathBuf::from("/home/dev/.local/bin/roxctl"),
            verified: false,
            smoke_ok: true,
        }));
        assert!(line.contains("unverified"));
    }

    #[test]
    fn test_outcome_line_skipped_and_failed() {
        let line = outcome_line(&report(InstallOutcome::Skipped {
            version: "v1.30.0".to_string(),
        }));
        assert!(line.contains("already up to date"));

        let line = outcome_line(&report(InstallOutcome::Failed {
            error: InstallError::checksum_unavailable("kubectl"),
        }));
        assert!(line.contains("No checksum available"));
    }
}
