//! Shared helpers for installer integration tests
//!
//! Fake tools are shell scripts so the placed binary can actually be
//! smoke-tested; wiremock serves version endpoints, checksum manifests,
//! and artifacts.

#![allow(dead_code)]

use std::io;
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;
use sha2::{Digest, Sha256};
use tar::{Builder, Header};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use toolforge_core::{
    ChecksumPolicy, NamingStrategy, ToolSpec, VersionRequest, VersionSource, VersionTagStyle,
};

pub const PINNED_VERSION: &str = "v1.30.0";
pub const WRONG_DIGEST: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// SHA256 hex digest of a byte slice
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// A fake tool binary: prints its version and records each invocation
pub fn counting_script(counter: &Path, version: &str) -> Vec<u8> {
    format!(
        "#!/bin/sh\necho run >> {}\necho {}\n",
        counter.display(),
        version
    )
    .into_bytes()
}

/// A fake tool binary that only prints its version
pub fn plain_script(version: &str) -> Vec<u8> {
    format!("#!/bin/sh\necho {}\n", version).into_bytes()
}

/// Number of times a counting script ran
pub fn invocation_count(counter: &Path) -> usize {
    std::fs::read_to_string(counter)
        .map(|s| s.lines().count())
        .unwrap_or(0)
}

/// Pre-install a fake binary into the destination directory
pub fn install_stub(dest_dir: &Path, name: &str, version: &str) {
    std::fs::create_dir_all(dest_dir).unwrap();
    let dest = dest_dir.join(name);
    std::fs::write(&dest, plain_script(version)).unwrap();

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&dest, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
}

/// A kubectl-shaped tool spec with every URL rebased onto the mock
/// server: deterministic single filename, stable-text version source,
/// bare-hash checksum side-file
pub fn kubectl_like(server_uri: &str) -> ToolSpec {
    ToolSpec {
        id: "kubectl".into(),
        bin_name: "kubectl".into(),
        display_name: "Kubernetes CLI".into(),
        required: true,
        default_version: VersionRequest::Latest,
        version_args: vec!["version".into(), "--client".into()],
        version_source: VersionSource::StableText {
            url: format!("{}/release/stable.txt", server_uri),
        },
        tag_style: VersionTagStyle::VPrefixed,
        naming: NamingStrategy::Deterministic {
            base_url: format!("{}/release/{{version}}/bin/linux/{{arch}}", server_uri),
            filenames: vec!["kubectl".into()],
        },
        checksum_sources: vec!["{url}.sha256".into()],
        checksum_policy: ChecksumPolicy::Required,
    }
}

/// An argocd-shaped tool spec: release-listing assets, shared
/// checksums manifest next to the artifacts
pub fn release_assets_tool(server_uri: &str) -> ToolSpec {
    ToolSpec {
        id: "argocd".into(),
        bin_name: "argocd".into(),
        display_name: "Argo CD CLI".into(),
        required: true,
        default_version: VersionRequest::Latest,
        version_args: vec!["version".into()],
        version_source: VersionSource::ReleaseLatest {
            url: format!("{}/repos/argoproj/argo-cd/releases/latest", server_uri),
        },
        tag_style: VersionTagStyle::VPrefixed,
        naming: NamingStrategy::ReleaseAssets {
            release_url: format!(
                "{}/repos/argoproj/argo-cd/releases/tags/{{version}}",
                server_uri
            ),
        },
        checksum_sources: vec!["{dir}/cli_checksums.txt".into()],
        checksum_policy: ChecksumPolicy::Required,
    }
}

/// Build a gzip-compressed tar archive with one executable file
pub fn tar_gz_single(path_in_archive: &str, content: &[u8]) -> Vec<u8> {
    let mut tar_bytes = Vec::new();
    {
        let mut builder = Builder::new(&mut tar_bytes);
        let mut header = Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder
            .append_data(&mut header, path_in_archive, content)
            .unwrap();
        builder.finish().unwrap();
    }

    let mut gz_bytes = Vec::new();
    {
        let mut encoder = GzEncoder::new(&mut gz_bytes, Compression::default());
        io::copy(&mut tar_bytes.as_slice(), &mut encoder).unwrap();
        encoder.finish().unwrap();
    }
    gz_bytes
}

/// Mount a text endpoint
pub async fn mock_text(server: &MockServer, url_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(url_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Mount a binary endpoint
pub async fn mock_bytes(server: &MockServer, url_path: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(url_path))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}

/// Mount an endpoint that always answers with `status`
pub async fn mock_status(server: &MockServer, url_path: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(url_path))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}
