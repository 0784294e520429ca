//! Install command

use anyhow::{bail, Result};

use toolforge_core::{default_catalog, InstallerConfig};
use toolforge_install::InstallerOrchestrator;

use crate::cli::InstallArgs;
use crate::output;

pub async fn run(args: InstallArgs) -> Result<()> {
    let catalog = default_catalog();
    validate_tool_ids(&catalog, args.tools.iter())?;

    let mut config = InstallerConfig::new(&args.dest).with_force(args.force);
    config.only = args.tools.clone();

    for pin in &args.pin {
        let (tool, version) = parse_pin(pin)?;
        validate_tool_ids(&catalog, std::iter::once(&tool.to_string()))?;
        config = config.with_pin(tool, version);
    }

    let orchestrator = InstallerOrchestrator::with_catalog(config, catalog)?;

    let spinner = output::spinner("Installing tools...");
    let report = orchestrator.run().await;
    spinner.finish_and_clear();

    output::header("Install summary");
    let mut failed = 0usize;
    for tool in &report.tools {
        println!("{}", output::outcome_line(tool));
        if tool.outcome.is_failure() {
            failed += 1;
        }
    }

    if let Some(id) = &report.aborted_by {
        bail!("aborted: required tool {} failed to install", id);
    }
    if failed > 0 {
        output::warning(&format!("{} optional tool(s) failed", failed));
    }

    Ok(())
}

/// Split a `tool=version` pin argument
fn parse_pin(raw: &str) -> Result<(&str, &str)> {
    match raw.split_once('=') {
        Some((tool, version)) if !tool.is_empty() && !version.is_empty() => Ok((tool, version)),
        _ => bail!("invalid pin {:?}, expected TOOL=VERSION", raw),
    }
}

fn validate_tool_ids<'a>(
    catalog: &[toolforge_core::ToolSpec],
    ids: impl Iterator<Item = &'a String>,
) -> Result<()> {
    for id in ids {
        if !catalog.iter().any(|t| &t.id == id) {
            let known: Vec<&str> = catalog.iter().map(|t| t.id.as_str()).collect();
            bail!("unknown tool {:?}, known tools: {}", id, known.join(", "));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pin() {
        assert_eq!(parse_pin("kubectl=1.30.0").unwrap(), ("kubectl", "1.30.0"));
        assert_eq!(parse_pin("oc=latest").unwrap(), ("oc", "latest"));
        assert!(parse_pin("kubectl").is_err());
        assert!(parse_pin("=1.30.0").is_err());
        assert!(parse_pin("kubectl=").is_err());
    }

    #[test]
    fn test_validate_tool_ids() {
        let catalog = default_catalog();
        let good = vec!["kubectl".to_string(), "helm".to_string()];
        assert!(validate_tool_ids(&catalog, good.iter()).is_ok());

        let bad = vec!["kubectll".to_string()];
        assert!(validate_tool_ids(&catalog, bad.iter()).is_err());
    }
}
