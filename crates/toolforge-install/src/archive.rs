//! Safe tar.gz extraction
//!
//! Third-party release archives are untrusted input: every entry path
//! and every link target is containment-checked against the extraction
//! directory before any bytes are written for that entry. Traversal
//! (`..`), absolute paths, and links pointing outside the destination
//! are all rejected with `UnsafeArchiveEntry`.

use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use tar::{Archive, EntryType};
use tracing::debug;

use toolforge_core::{InstallError, Result};

/// Extract a gzip-compressed tar archive into `dest`
pub fn extract_tar_gz(archive_path: &Path, dest: &Path) -> Result<()> {
    debug!("Extracting {:?} -> {:?}", archive_path, dest);
    fs::create_dir_all(dest)?;

    let file = File::open(archive_path)?;
    let mut archive = Archive::new(GzDecoder::new(file));

    for entry in archive.entries()? {
        let mut entry = entry?;
        let entry_path = entry.path()?.into_owned();
        let target = contain(dest, &entry_path)?;

        match entry.header().entry_type() {
            EntryType::Directory => {
                fs::create_dir_all(&target)?;
            }

            EntryType::Symlink => {
                let link = link_name(&entry, &entry_path)?;
                validate_link_target(dest, &entry_path, &link)?;
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)?;
                }
                if target.symlink_metadata().is_ok() {
                    fs::remove_file(&target)?;
                }
                #[cfg(unix)]
                std::os::unix::fs::symlink(&link, &target)?;
            }

            EntryType::Link => {
                let link = link_name(&entry, &entry_path)?;
                // Hard link targets are archive-relative paths.
                let source = contain(dest, &link)?;
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::hard_link(&source, &target)?;
            }

            t if t.is_file() => {
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)?;
                }
                let mut out = File::create(&target)?;
                io::copy(&mut entry, &mut out)?;

                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    if let Ok(mode) = entry.header().mode() {
                        fs::set_permissions(&target, fs::Permissions::from_mode(mode & 0o777))?;
                    }
                }
            }

            // PAX/GNU metadata entries carry no payload of their own.
            _ => {}
        }
    }

    Ok(())
}

/// Join an archive-relative path onto `dest`, rejecting any escape
///
/// Components are normalized lexically: `.` is dropped, `..` pops, and
/// popping past the destination root (or an absolute component) is an
/// unsafe entry.
fn contain(dest: &Path, relative: &Path) -> Result<PathBuf> {
    let mut normalized = PathBuf::new();

    for component in relative.components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    return Err(InstallError::unsafe_entry(
                        relative.display().to_string(),
                        "path escapes extraction directory",
                    ));
                }
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(InstallError::unsafe_entry(
                    relative.display().to_string(),
                    "absolute path in archive",
                ));
            }
        }
    }

    Ok(dest.join(normalized))
}

/// Check that a symlink target stays inside `dest`
///
/// Relative targets resolve against the entry's own directory;
/// absolute targets are rejected outright.
fn validate_link_target(dest: &Path, entry_path: &Path, link: &Path) -> Result<()> {
    if link.is_absolute() {
        return Err(InstallError::unsafe_entry(
            entry_path.display().to_string(),
            format!("absolute symlink target {:?}", link),
        ));
    }

    let entry_dir = entry_path.parent().unwrap_or_else(|| Path::new(""));
    contain(dest, &entry_dir.join(link)).map_err(|_| {
        InstallError::unsafe_entry(
            entry_path.display().to_string(),
            format!("symlink target {:?} escapes extraction directory", link),
        )
    })?;

    Ok(())
}

fn link_name<R: io::Read>(entry: &tar::Entry<'_, R>, entry_path: &Path) -> Result<PathBuf> {
    entry
        .link_name()?
        .map(|l| l.into_owned())
        .ok_or_else(|| {
            InstallError::unsafe_entry(
                entry_path.display().to_string(),
                "link entry without a target",
            )
        })
}

/// Find a file named `binary` anywhere under `root`
pub fn find_binary(root: &Path, binary: &str) -> Option<PathBuf> {
    let entries = fs::read_dir(root).ok()?;
    let mut subdirs = Vec::new();

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_file() {
            if path.file_name().and_then(|n| n.to_str()) == Some(binary) {
                return Some(path);
            }
        } else if path.is_dir() {
            subdirs.push(path);
        }
    }

    subdirs.iter().find_map(|dir| find_binary(dir, binary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use tar::{Builder, Header};

    fn tar_gz(build: impl FnOnce(&mut Builder<&mut Vec<u8>>)) -> Vec<u8> {
        let mut tar_bytes = Vec::new();
        {
            let mut builder = Builder::new(&mut tar_bytes);
            build(&mut builder);
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

    fn add_file(builder: &mut Builder<&mut Vec<u8>>, path: &str, content: &[u8], mode: u32) {
        let mut header = Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(mode);
        // Write the name bytes directly: `append_data` validates paths and
        // would refuse to build the malicious `..` entries some tests need.
        header.as_gnu_mut().unwrap().name[..path.len()].copy_from_slice(path.as_bytes());
        header.set_cksum();
        builder.append(&header, content).unwrap();
    }

    fn add_symlink(builder: &mut Builder<&mut Vec<u8>>, path: &str, target: &str) {
        let mut header = Header::new_gnu();
        header.set_entry_type(EntryType::Symlink);
        header.set_size(0);
        header.set_cksum();
        builder.append_link(&mut header, path, target).unwrap();
    }

    fn write_archive(dir: &Path, bytes: &[u8]) -> PathBuf {
        let path = dir.join("test.tar.gz");
        fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_extracts_wellformed_nested_archive() {
        let tmp = tempfile::tempdir().unwrap();
        let bytes = tar_gz(|b| {
            add_file(b, "bundle/oc", b"#!/bin/sh\necho oc\n", 0o755);
            add_file(b, "bundle/docs/README.md", b"docs", 0o644);
        });
        let archive = write_archive(tmp.path(), &bytes);

        let dest = tmp.path().join("out");
        extract_tar_gz(&archive, &dest).unwrap();

        assert!(dest.join("bundle/oc").is_file());
        assert!(dest.join("bundle/docs/README.md").is_file());
    }

    #[test]
    fn test_preserves_executable_mode() {
        let tmp = tempfile::tempdir().unwrap();
        let bytes = tar_gz(|b| add_file(b, "tool", b"binary", 0o755));
        let archive = write_archive(tmp.path(), &bytes);

        let dest = tmp.path().join("out");
        extract_tar_gz(&archive, &dest).unwrap();

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(dest.join("tool")).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }

    #[test]
    fn test_rejects_parent_traversal() {
        let tmp = tempfile::tempdir().unwrap();
        let bytes = tar_gz(|b| add_file(b, "../../etc/passwd", b"pwned", 0o644));
        let archive = write_archive(tmp.path(), &bytes);

        let dest = tmp.path().join("out");
        let err = extract_tar_gz(&archive, &dest).unwrap_err();
        assert!(matches!(err, InstallError::UnsafeArchiveEntry { .. }));

        // Nothing was written for the malicious entry.
        assert!(!tmp.path().join("etc/passwd").exists());
    }

    #[test]
    fn test_rejects_escaping_symlink() {
        let tmp = tempfile::tempdir().unwrap();
        let bytes = tar_gz(|b| add_symlink(b, "innocent", "../../outside"));
        let archive = write_archive(tmp.path(), &bytes);

        let dest = tmp.path().join("out");
        let err = extract_tar_gz(&archive, &dest).unwrap_err();
        assert!(matches!(err, InstallError::UnsafeArchiveEntry { .. }));
        assert!(!dest.join("innocent").exists());
    }

    #[test]
    fn test_rejects_absolute_symlink() {
        let tmp = tempfile::tempdir().unwrap();
        let bytes = tar_gz(|b| add_symlink(b, "etc-link", "/etc"));
        let archive = write_archive(tmp.path(), &bytes);

        let dest = tmp.path().join("out");
        let err = extract_tar_gz(&archive, &dest).unwrap_err();
        assert!(matches!(err, InstallError::UnsafeArchiveEntry { .. }));
    }

    #[test]
    fn test_accepts_contained_symlink() {
        let tmp = tempfile::tempdir().unwrap();
        let bytes = tar_gz(|b| {
            add_file(b, "bin/tool-1.0", b"binary", 0o755);
            add_symlink(b, "bin/tool", "tool-1.0");
        });
        let archive = write_archive(tmp.path(), &bytes);

        let dest = tmp.path().join("out");
        extract_tar_gz(&archive, &dest).unwrap();

        let link = dest.join("bin/tool");
        assert!(link.symlink_metadata().unwrap().file_type().is_symlink());
    }

    #[test]
    fn test_find_binary_nested() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("linux-amd64")).unwrap();
        fs::write(tmp.path().join("linux-amd64/helm"), b"helm").unwrap();

        let found = find_binary(tmp.path(), "helm").unwrap();
        assert!(found.ends_with("linux-amd64/helm"));
        assert_eq!(find_binary(tmp.path(), "missing"), None);
    }
}
