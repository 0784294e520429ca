//! Tool catalog and per-tool strategy tables
//!
//! Each managed CLI tool is described by a [`ToolSpec`]: where its
//! versions come from, how its release artifacts are named, where its
//! checksum manifests live, and how strict verification has to be.
//! Everything that varies per tool lives here as data so the installer
//! pipeline itself stays free of per-tool special cases.
//!
//! URL and filename fields are templates; see [`RenderContext`] for
//! the recognized placeholders. Keeping them as owned strings lets
//! tests rebase every URL onto a mock server.

use crate::arch::Architecture;

/// Desired version for a tool: an explicit pin or "latest"
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionRequest {
    /// Resolve the newest version from the tool's upstream source
    Latest,
    /// Use this exact version (normalized per the tool's tag style)
    Pin(String),
}

/// How a tool's upstream publishes its current version
#[derive(Debug, Clone)]
pub enum VersionSource {
    /// A plain-text endpoint whose trimmed body is the version tag
    /// (e.g., kubectl's `stable.txt`)
    StableText { url: String },

    /// A release-listing API returning JSON with a `tag_name` field
    /// (GitHub releases)
    ReleaseLatest { url: String },

    /// Pages scanned newest-to-oldest for the first token captured by
    /// `pattern`; `fallback` is the last-known-good version used when
    /// every page fails
    DocScan {
        pages: Vec<String>,
        pattern: String,
        fallback: String,
    },
}

/// Tag prefix convention expected by a tool's artifact URLs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionTagStyle {
    /// Tags carry a leading `v` (e.g., "v1.30.0")
    VPrefixed,
    /// Tags are the bare number (e.g., "4.14.9")
    Bare,
}

impl VersionTagStyle {
    /// Normalize a user-supplied version into this tag style
    pub fn normalize(&self, version: &str) -> String {
        let trimmed = version.trim();
        let bare = trimmed.strip_prefix('v').unwrap_or(trimmed);
        match self {
            VersionTagStyle::VPrefixed => format!("v{}", bare),
            VersionTagStyle::Bare => bare.to_string(),
        }
    }
}

/// How a tool names its release artifacts
#[derive(Debug, Clone)]
pub enum NamingStrategy {
    /// Fixed filename templates under a base URL; listed in preference
    /// order, each interpolated with version and architecture
    Deterministic {
        base_url: String,
        filenames: Vec<String>,
    },

    /// Filenames advertised by a release-listing API and filtered for
    /// platform compatibility; `release_url` takes `{version}`
    ReleaseAssets { release_url: String },
}

/// Whether a missing checksum aborts the install
///
/// Mismatched checksums are always fatal; this flag only governs the
/// case where no digest could be obtained at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumPolicy {
    /// Refuse to install without a verified digest
    Required,
    /// Install anyway with a logged warning
    BestEffort,
}

/// Definition of one managed CLI tool
#[derive(Debug, Clone)]
pub struct ToolSpec {
    /// Unique identifier (e.g., "kubectl")
    pub id: String,

    /// Filename installed into the destination directory
    pub bin_name: String,

    /// Human-readable name for output
    pub display_name: String,

    /// Whether a failure aborts the whole run
    pub required: bool,

    /// Default desired version when no pin is configured
    pub default_version: VersionRequest,

    /// Arguments that make the installed binary report its version
    pub version_args: Vec<String>,

    /// Upstream version source for "latest"
    pub version_source: VersionSource,

    /// Tag prefix convention for explicit pins
    pub tag_style: VersionTagStyle,

    /// Artifact naming strategy
    pub naming: NamingStrategy,

    /// Checksum manifest URL templates, tried in order
    pub checksum_sources: Vec<String>,

    /// Severity of a missing checksum
    pub checksum_policy: ChecksumPolicy,
}

/// Values substituted into URL and filename templates
///
/// Recognized placeholders: `{version}` (normalized tag),
/// `{bare_version}` (tag without the leading `v`), `{arch}` (amd64 /
/// arm64), `{raw_arch}` (x86_64 / aarch64), `{filename}`, `{url}` (the
/// artifact URL) and `{dir}` (the artifact URL with the last path
/// segment removed).
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    pub version: String,
    pub bare_version: String,
    pub arch: String,
    pub raw_arch: String,
    pub filename: String,
    pub url: String,
    pub dir: String,
}

impl RenderContext {
    /// Context with version and architecture filled in
    pub fn for_version(version: &str, arch: Architecture) -> Self {
        Self {
            version: version.to_string(),
            bare_version: version.strip_prefix('v').unwrap_or(version).to_string(),
            arch: arch.token().to_string(),
            raw_arch: arch.raw_token().to_string(),
            ..Default::default()
        }
    }

    /// Extend the context with a chosen artifact
    pub fn with_artifact(mut self, filename: &str, url: &str) -> Self {
        self.filename = filename.to_string();
        self.url = url.to_string();
        self.dir = url.rsplit_once('/').map(|(d, _)| d.to_string()).unwrap_or_default();
        self
    }

    /// Interpolate a template with this context
    pub fn render(&self, template: &str) -> String {
        template
            .replace("{version}", &self.version)
            .replace("{bare_version}", &self.bare_version)
            .replace("{arch}", &self.arch)
            .replace("{raw_arch}", &self.raw_arch)
            .replace("{filename}", &self.filename)
            .replace("{url}", &self.url)
            .replace("{dir}", &self.dir)
    }
}

/// Build the default tool catalog in install order
///
/// Required tools come first so a hard failure aborts before any
/// best-effort work is attempted.
pub fn default_catalog() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            id: "oc".into(),
            bin_name: "oc".into(),
            display_name: "OpenShift CLI".into(),
            required: true,
            // The OCP mirror has no trim-friendly latest endpoint, so oc
            // ships with the known-good default and DocScan for "latest".
            default_version: VersionRequest::Pin("4.14.9".into()),
            version_args: vec!["version".into(), "--client".into()],
            version_source: VersionSource::DocScan {
                pages: vec![
                    "https://mirror.openshift.com/pub/openshift-v4/clients/ocp/stable/release.txt"
                        .into(),
                ],
                pattern: r"Version:\s*([0-9]+\.[0-9]+\.[0-9]+)".into(),
                fallback: "4.14.9".into(),
            },
            tag_style: VersionTagStyle::Bare,
            naming: NamingStrategy::Deterministic {
                base_url:
                    "https://mirror.openshift.com/pub/openshift-v4/{raw_arch}/clients/ocp/{version}"
                        .into(),
                filenames: vec![
                    "openshift-client-linux-{version}.tar.gz".into(),
                    "openshift-client-linux.tar.gz".into(),
                ],
            },
            checksum_sources: vec!["{dir}/sha256sum.txt".into()],
            checksum_policy: ChecksumPolicy::Required,
        },
        ToolSpec {
            id: "kubectl".into(),
            bin_name: "kubectl".into(),
            display_name: "Kubernetes CLI".into(),
            required: true,
            default_version: VersionRequest::Latest,
            version_args: vec!["version".into(), "--client".into()],
            version_source: VersionSource::StableText {
                url: "https://dl.k8s.io/release/stable.txt".into(),
            },
            tag_style: VersionTagStyle::VPrefixed,
            naming: NamingStrategy::Deterministic {
                base_url: "https://dl.k8s.io/release/{version}/bin/linux/{arch}".into(),
                filenames: vec!["kubectl".into()],
            },
            checksum_sources: vec!["{url}.sha256".into()],
            checksum_policy: ChecksumPolicy::Required,
        },
        ToolSpec {
            id: "argocd".into(),
            bin_name: "argocd".into(),
            display_name: "Argo CD CLI".into(),
            required: true,
            default_version: VersionRequest::Latest,
            version_args: vec!["version".into(), "--client".into(), "--short".into()],
            version_source: VersionSource::ReleaseLatest {
                url: "https://api.github.com/repos/argoproj/argo-cd/releases/latest".into(),
            },
            tag_style: VersionTagStyle::VPrefixed,
            naming: NamingStrategy::ReleaseAssets {
                release_url: "https://api.github.com/repos/argoproj/argo-cd/releases/tags/{version}"
                    .into(),
            },
            checksum_sources: vec![
                "https://github.com/argoproj/argo-cd/releases/download/{version}/cli_checksums.txt"
                    .into(),
            ],
            checksum_policy: ChecksumPolicy::Required,
        },
        ToolSpec {
            id: "helm".into(),
            bin_name: "helm".into(),
            display_name: "Helm".into(),
            required: true,
            default_version: VersionRequest::Latest,
            version_args: vec!["version".into(), "--short".into()],
            version_source: VersionSource::ReleaseLatest {
                url: "https://api.github.com/repos/helm/helm/releases/latest".into(),
            },
            tag_style: VersionTagStyle::VPrefixed,
            naming: NamingStrategy::Deterministic {
                base_url: "https://get.helm.sh".into(),
                filenames: vec!["helm-{version}-linux-{arch}.tar.gz".into()],
            },
            // Helm has published both suffixes over time.
            checksum_sources: vec!["{url}.sha256sum".into(), "{url}.sha256".into()],
            checksum_policy: ChecksumPolicy::Required,
        },
        ToolSpec {
            id: "tkn".into(),
            bin_name: "tkn".into(),
            display_name: "Tekton CLI".into(),
            required: false,
            default_version: VersionRequest::Latest,
            version_args: vec!["version".into()],
            version_source: VersionSource::ReleaseLatest {
                url: "https://api.github.com/repos/tektoncd/cli/releases/latest".into(),
            },
            tag_style: VersionTagStyle::VPrefixed,
            naming: NamingStrategy::ReleaseAssets {
                release_url: "https://api.github.com/repos/tektoncd/cli/releases/tags/{version}"
                    .into(),
            },
            checksum_sources: vec!["{dir}/checksums.txt".into()],
            checksum_policy: ChecksumPolicy::Required,
        },
        ToolSpec {
            id: "compose".into(),
            bin_name: "docker-compose".into(),
            display_name: "Docker Compose".into(),
            required: false,
            default_version: VersionRequest::Latest,
            version_args: vec!["version".into(), "--short".into()],
            version_source: VersionSource::ReleaseLatest {
                url: "https://api.github.com/repos/docker/compose/releases/latest".into(),
            },
            tag_style: VersionTagStyle::VPrefixed,
            naming: NamingStrategy::ReleaseAssets {
                release_url: "https://api.github.com/repos/docker/compose/releases/tags/{version}"
                    .into(),
            },
            checksum_sources: vec!["{dir}/checksums.txt".into(), "{url}.sha256".into()],
            checksum_policy: ChecksumPolicy::Required,
        },
        ToolSpec {
            id: "roxctl".into(),
            bin_name: "roxctl".into(),
            display_name: "StackRox CLI".into(),
            required: false,
            default_version: VersionRequest::Latest,
            version_args: vec!["version".into()],
            version_source: VersionSource::DocScan {
                pages: vec![
                    "https://docs.openshift.com/acs/4.8/cli/getting-started-cli.html".into(),
                    "https://docs.openshift.com/acs/4.7/cli/getting-started-cli.html".into(),
                    "https://docs.openshift.com/acs/4.6/cli/getting-started-cli.html".into(),
                ],
                pattern: r"/rhacs/assets/([0-9]+\.[0-9]+\.[0-9]+)/".into(),
                fallback: "4.6.0".into(),
            },
            tag_style: VersionTagStyle::Bare,
            naming: NamingStrategy::Deterministic {
                base_url: "https://mirror.openshift.com/pub/rhacs/assets/{version}/bin/Linux".into(),
                filenames: vec!["roxctl".into()],
            },
            // The assets mirror publishes no manifest reliably; verify
            // when the side-file exists, warn otherwise.
            checksum_sources: vec!["{url}.sha256".into()],
            checksum_policy: ChecksumPolicy::BestEffort,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_style_normalize() {
        assert_eq!(VersionTagStyle::VPrefixed.normalize("1.30.0"), "v1.30.0");
        assert_eq!(VersionTagStyle::VPrefixed.normalize("v1.30.0"), "v1.30.0");
        assert_eq!(VersionTagStyle::Bare.normalize("v4.14.9"), "4.14.9");
        assert_eq!(VersionTagStyle::Bare.normalize("4.14.9"), "4.14.9");
        assert_eq!(VersionTagStyle::VPrefixed.normalize("  v2.0.1 "), "v2.0.1");
    }

    #[test]
    fn test_render_context() {
        let ctx = RenderContext::for_version("v1.30.0", Architecture::Amd64);
        assert_eq!(
            ctx.render("https://dl.k8s.io/release/{version}/bin/linux/{arch}"),
            "https://dl.k8s.io/release/v1.30.0/bin/linux/amd64"
        );
        assert_eq!(ctx.render("client-{bare_version}.tar.gz"), "client-1.30.0.tar.gz");
        assert_eq!(ctx.render("{raw_arch}"), "x86_64");
    }

    #[test]
    fn test_render_context_with_artifact() {
        let ctx = RenderContext::for_version("v1.30.0", Architecture::Arm64)
            .with_artifact("kubectl", "https://dl.k8s.io/release/v1.30.0/bin/linux/arm64/kubectl");
        assert_eq!(
            ctx.render("{url}.sha256"),
            "https://dl.k8s.io/release/v1.30.0/bin/linux/arm64/kubectl.sha256"
        );
        assert_eq!(
            ctx.render("{dir}/sha256sum.txt"),
            "https://dl.k8s.io/release/v1.30.0/bin/linux/arm64/sha256sum.txt"
        );
    }

    #[test]
    fn test_default_catalog_shape() {
        let catalog = default_catalog();
        assert_eq!(catalog.len(), 7);

        // Required tools precede best-effort ones.
        let first_best_effort = catalog.iter().position(|t| !t.required).unwrap();
        assert!(catalog[..first_best_effort].iter().all(|t| t.required));
        assert!(catalog[first_best_effort..].iter().all(|t| !t.required));

        // IDs are unique.
        let mut ids: Vec<_> = catalog.iter().map(|t| t.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), catalog.len());
    }

    #[test]
    fn test_catalog_checksum_policies() {
        let catalog = default_catalog();
        let roxctl = catalog.iter().find(|t| t.id == "roxctl").unwrap();
        assert_eq!(roxctl.checksum_policy, ChecksumPolicy::BestEffort);

        let kubectl = catalog.iter().find(|t| t.id == "kubectl").unwrap();
        assert_eq!(kubectl.checksum_policy, ChecksumPolicy::Required);
        assert!(kubectl.required);
    }
}
