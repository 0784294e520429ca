//! Error types for toolforge-core

use thiserror::Error;

/// Result type alias using toolforge's error type
pub type Result<T> = std::result::Result<T, InstallError>;

/// Errors produced while installing a tool
///
/// Every variant is absorbed at the install-transaction boundary and
/// converted into a `Failed` outcome; none of them crosses the
/// orchestrator uncaught.
#[derive(Error, Debug)]
pub enum InstallError {
    /// No version could be determined for a tool
    #[error("Could not resolve a version for {tool}: {detail}")]
    VersionResolution { tool: String, detail: String },

    /// Platform filtering left no usable release artifact
    #[error("No compatible artifact for {tool} ({arch}): {detail}")]
    NoCompatibleArtifact {
        tool: String,
        arch: String,
        detail: String,
    },

    /// No checksum could be obtained; fatal only for tools whose
    /// policy requires verification
    #[error("No checksum available for {artifact}")]
    ChecksumUnavailable { artifact: String },

    /// Computed digest does not match the published one; always fatal
    #[error("Checksum mismatch for {artifact}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        artifact: String,
        expected: String,
        actual: String,
    },

    /// Download or version lookup failed
    #[error("Network error fetching {url}: {detail}")]
    Network { url: String, detail: String },

    /// An archive entry would escape the extraction directory
    #[error("Unsafe archive entry rejected: {entry}: {detail}")]
    UnsafeArchiveEntry { entry: String, detail: String },

    /// The archive did not contain the expected binary
    #[error("Binary '{binary}' not found in archive {archive}")]
    BinaryNotFoundInArchive { binary: String, archive: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl InstallError {
    /// Create a version resolution error
    pub fn version_resolution(tool: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::VersionResolution {
            tool: tool.into(),
            detail: detail.into(),
        }
    }

    /// Create a no-compatible-artifact error
    pub fn no_compatible_artifact(
        tool: impl Into<String>,
        arch: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self::NoCompatibleArtifact {
            tool: tool.into(),
            arch: arch.into(),
            detail: detail.into(),
        }
    }

    /// Create a checksum unavailable error
    pub fn checksum_unavailable(artifact: impl Into<String>) -> Self {
        Self::ChecksumUnavailable {
            artifact: artifact.into(),
        }
    }

    /// Create a checksum mismatch error
    pub fn checksum_mismatch(
        artifact: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::ChecksumMismatch {
            artifact: artifact.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a network error
    pub fn network(url: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Network {
            url: url.into(),
            detail: detail.into(),
        }
    }

    /// Create an unsafe archive entry error
    pub fn unsafe_entry(entry: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::UnsafeArchiveEntry {
            entry: entry.into(),
            detail: detail.into(),
        }
    }

    /// Create a binary-not-found error
    pub fn binary_not_found(binary: impl Into<String>, archive: impl Into<String>) -> Self {
        Self::BinaryNotFoundInArchive {
            binary: binary.into(),
            archive: archive.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = InstallError::checksum_mismatch("kubectl", "aaaa", "bbbb");
        let msg = err.to_string();
        assert!(msg.contains("kubectl"));
        assert!(msg.contains("aaaa"));
        assert!(msg.contains("bbbb"));
    }

    #[test]
    fn test_unsafe_entry_display() {
        let err = InstallError::unsafe_entry("../../etc/passwd", "escapes extraction directory");
        assert!(err.to_string().contains("../../etc/passwd"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: InstallError = io.into();
        assert!(matches!(err, InstallError::Io(_)));
    }
}
