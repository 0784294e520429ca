//! List command

use anyhow::Result;

use toolforge_core::{default_catalog, VersionRequest};
use toolforge_install::probe_installed;

use crate::cli::ListArgs;
use crate::output;

pub async fn run(args: ListArgs) -> Result<()> {
    output::header(&format!("Managed tools ({})", args.dest.display()));

    for tool in default_catalog() {
        let dest_path = args.dest.join(&tool.bin_name);
        let state = probe_installed(&dest_path, &tool).await;

        let status = if state.present {
            match state.reported_version {
                Some(version) => format!("installed {}", version),
                None => "installed (version unknown)".to_string(),
            }
        } else if let Ok(path) = which::which(&tool.bin_name) {
            format!("not managed (found at {})", path.display())
        } else {
            "not installed".to_string()
        };

        let default = match &tool.default_version {
            VersionRequest::Latest => "latest".to_string(),
            VersionRequest::Pin(version) => version.clone(),
        };

        output::kv(
            &tool.id,
            &format!(
                "{} [{}, default {}{}]",
                status,
                tool.display_name,
                default,
                if tool.required { "" } else { ", best-effort" }
            ),
        );
    }

    Ok(())
}
