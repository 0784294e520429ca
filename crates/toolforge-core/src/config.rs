//! Installer configuration
//!
//! One immutable struct built from CLI flags and handed to the
//! orchestrator, replacing any environment-variable driven knobs.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::tools::{ToolSpec, VersionRequest};

/// Configuration for one installer run
#[derive(Debug, Clone)]
pub struct InstallerConfig {
    /// Flat directory receiving one executable per tool; created if
    /// absent
    pub dest_dir: PathBuf,

    /// Per-tool version pins (tool id -> version); tools without a pin
    /// use their catalog default
    pub pins: HashMap<String, String>,

    /// Reinstall even when the installed version already matches
    pub force: bool,

    /// Restrict the run to these tool ids; empty means the whole
    /// catalog
    pub only: Vec<String>,
}

impl InstallerConfig {
    /// Create a configuration installing into `dest_dir`
    pub fn new(dest_dir: impl Into<PathBuf>) -> Self {
        Self {
            dest_dir: dest_dir.into(),
            pins: HashMap::new(),
            force: false,
            only: Vec::new(),
        }
    }

    /// Pin a tool to an exact version
    pub fn with_pin(mut self, tool: impl Into<String>, version: impl Into<String>) -> Self {
        self.pins.insert(tool.into(), version.into());
        self
    }

    /// Ignore the installed-version short-circuit
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// The default destination: `~/.local/bin`
    pub fn default_dest_dir() -> PathBuf {
        dirs::home_dir()
            .map(|home| home.join(".local").join("bin"))
            .unwrap_or_else(|| PathBuf::from(".local/bin"))
    }

    /// The desired version for a tool: explicit pin, else the catalog
    /// default
    pub fn version_request(&self, tool: &ToolSpec) -> VersionRequest {
        match self.pins.get(&tool.id) {
            Some(pin) if pin.eq_ignore_ascii_case("latest") => VersionRequest::Latest,
            Some(pin) => VersionRequest::Pin(pin.clone()),
            None => tool.default_version.clone(),
        }
    }

    /// Whether this run includes the given tool
    pub fn includes(&self, tool: &ToolSpec) -> bool {
        self.only.is_empty() || self.only.iter().any(|id| id == &tool.id)
    }
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self::new(Self::default_dest_dir())
    }
}
