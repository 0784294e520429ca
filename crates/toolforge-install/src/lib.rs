//! Verified artifact installer for Toolforge
//!
//! Provides:
//! - Version resolution against upstream sources (stable-text
//!   endpoints, release-listing APIs, documentation-page scanning)
//! - Architecture-aware artifact candidate selection
//! - Checksum resolution from cascading manifest sources
//! - Streaming downloads with SHA256 verification
//! - Safe tar.gz extraction (path and symlink containment)
//! - Atomic placement of binaries with an idempotency short-circuit
//! - Sequential orchestration over the tool catalog

pub mod archive;
pub mod checksum;
pub mod fetch;
pub mod locate;
pub mod orchestrator;
pub mod transaction;
pub mod version;

pub use checksum::ChecksumResolver;
pub use fetch::Fetcher;
pub use locate::{ArtifactCandidate, ArtifactLocator, Release, ReleaseAsset};
pub use orchestrator::{InstallReport, InstallerOrchestrator, ToolReport};
pub use transaction::{probe_installed, InstallOutcome, InstallTransaction, InstalledState};
pub use version::{ResolvedVersion, VersionOracle, VersionProvenance};

/// Current crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
