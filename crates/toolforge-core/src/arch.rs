//! CPU architecture detection
//!
//! Release artifacts are published per architecture, so every other
//! component consumes the canonical tag produced here. Only 64-bit x86
//! and 64-bit ARM are supported; anything else folds to amd64, which
//! is the documented fallback rather than an error.

use std::fmt;

/// Canonical CPU architectures understood by the artifact locator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Architecture {
    /// x86_64 / AMD64
    Amd64,
    /// ARM64 / AArch64
    Arm64,
}

impl Architecture {
    /// Detect the architecture of the running host
    ///
    /// Computed from the compiler-reported machine string; called once
    /// per run by the orchestrator.
    pub fn detect() -> Self {
        Self::from_machine(std::env::consts::ARCH)
    }

    /// Fold a raw machine string into a canonical architecture
    ///
    /// Unknown strings map to [`Architecture::Amd64`].
    pub fn from_machine(machine: &str) -> Self {
        match machine.to_ascii_lowercase().as_str() {
            "aarch64" | "arm64" => Architecture::Arm64,
            "x86_64" | "amd64" => Architecture::Amd64,
            _ => Architecture::Amd64,
        }
    }

    /// The architecture token used in download URLs (e.g., "amd64")
    pub fn token(&self) -> &'static str {
        match self {
            Architecture::Amd64 => "amd64",
            Architecture::Arm64 => "arm64",
        }
    }

    /// The raw machine token some mirrors use in their directory layout
    /// (e.g., "x86_64")
    pub fn raw_token(&self) -> &'static str {
        match self {
            Architecture::Amd64 => "x86_64",
            Architecture::Arm64 => "aarch64",
        }
    }

    /// All name fragments that identify this architecture in release
    /// asset filenames
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Architecture::Amd64 => &["amd64", "x86_64"],
            Architecture::Arm64 => &["arm64", "aarch64"],
        }
    }

    /// The other supported architecture, used to reject its artifacts
    pub fn opposite(&self) -> Self {
        match self {
            Architecture::Amd64 => Architecture::Arm64,
            Architecture::Arm64 => Architecture::Amd64,
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}
