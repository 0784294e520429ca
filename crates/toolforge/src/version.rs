//! Version information for the toolforge CLI

use serde::Serialize;

use toolforge_core::default_catalog;

/// Version report: the CLI build and the tool catalog it carries
#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    /// CLI semantic version
    pub version: String,

    /// Ids of the tools this build can manage, in install order
    pub tools: Vec<String>,
}

impl VersionInfo {
    /// Version info for the current build and its compiled-in catalog
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            tools: default_catalog().into_iter().map(|t| t.id).collect(),
        }
    }

    /// One-line display form
    pub fn display(&self) -> String {
        format!(
            "toolforge {} ({} managed tools)",
            self.version,
            self.tools.len()
        )
    }
}

impl std::fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}
