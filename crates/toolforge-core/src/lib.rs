//! Core library for the Toolforge CLI
//!
//! This crate holds the pieces shared by the installer library and the
//! CLI binary: the canonical architecture type, the tool catalog with
//! its table-driven naming/version/checksum strategies, the installer
//! configuration, and the error taxonomy.

pub mod arch;
pub mod config;
pub mod error;
pub mod tools;

pub use arch::Architecture;
pub use config::InstallerConfig;
pub use error::{InstallError, Result};
pub use tools::{
    default_catalog, ChecksumPolicy, NamingStrategy, RenderContext, ToolSpec, VersionRequest,
    VersionSource, VersionTagStyle,
};
