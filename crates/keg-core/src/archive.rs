//! Unpack `.tar.gz` source archives.
//!
//! Tag archives wrap the tree in a single `<name>-<version>/` directory; that
//! first component is stripped so the returned root is the module root.

use crate::error::{InstallError, Result};
use flate2::read::GzDecoder;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tar::{Archive, EntryType};

/// Unpack gzip'd tar `bytes` into `dest`, dropping the leading path component.
///
/// Entries that would land outside `dest` (absolute paths, `..`) are rejected,
/// as are symlinks and hardlinks whose target resolves outside the unpacked
/// tree. In-tree links are recreated.
pub fn unpack_tar_gz(bytes: &[u8], dest: &Path) -> Result<()> {
    fs::create_dir_all(dest)
        .map_err(|e| InstallError::io(format!("create {}", dest.display()), e))?;

    let mut archive = Archive::new(GzDecoder::new(bytes));
    archive.set_preserve_permissions(true);
    let entries = archive
        .entries()
        .map_err(|e| InstallError::Archive(format!("read archive: {}", e)))?;

    let mut unpacked = 0usize;
    for entry in entries {
        let mut entry =
            entry.map_err(|e| InstallError::Archive(format!("read archive entry: {}", e)))?;
        let path = entry
            .path()
            .map_err(|e| InstallError::Archive(format!("invalid entry path: {}", e)))?
            .into_owned();

        let kind = entry.header().entry_type();
        match kind {
            EntryType::Regular
            | EntryType::Directory
            | EntryType::Continuous
            | EntryType::Symlink
            | EntryType::Link => {}
            // Global/extended headers carry metadata only.
            EntryType::XGlobalHeader | EntryType::XHeader => continue,
            other => {
                tracing::debug!(path = %path.display(), ?other, "skipping archive entry");
                continue;
            }
        }

        let Some(stripped) = strip_first_component(&path)? else {
            continue;
        };
        let dest_path = dest.join(&stripped);

        if kind == EntryType::Directory {
            fs::create_dir_all(&dest_path)
                .map_err(|e| InstallError::io(format!("create {}", dest_path.display()), e))?;
            continue;
        }
        if let Some(parent) = dest_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| InstallError::io(format!("create {}", parent.display()), e))?;
        }
        if kind == EntryType::Link {
            let source = hardlink_source(&entry, &path, dest)?;
            fs::hard_link(&source, &dest_path)
                .map_err(|e| InstallError::io(format!("link {}", dest_path.display()), e))?;
            unpacked += 1;
            continue;
        }
        if kind == EntryType::Symlink {
            check_symlink_target(&entry, &path, &stripped)?;
        }
        entry
            .unpack(&dest_path)
            .map_err(|e| InstallError::io(format!("unpack {}", dest_path.display()), e))?;
        unpacked += 1;
    }

    if unpacked == 0 {
        return Err(InstallError::Archive("archive contains no files".to_string()));
    }
    tracing::debug!(files = unpacked, dest = %dest.display(), "archive unpacked");
    Ok(())
}

/// Drops the first normal component. Returns None for the top-level directory
/// itself; errors on paths that would escape the destination.
fn strip_first_component(path: &Path) -> Result<Option<PathBuf>> {
    let mut out = PathBuf::new();
    let mut skipped = false;
    for component in path.components() {
        match component {
            Component::Normal(part) => {
                if skipped {
                    out.push(part);
                } else {
                    skipped = true;
                }
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(InstallError::Archive(format!(
                    "entry escapes destination: {}",
                    path.display()
                )));
            }
        }
    }
    Ok((!out.as_os_str().is_empty()).then_some(out))
}

fn link_target<R: std::io::Read>(entry: &tar::Entry<'_, R>, path: &Path) -> Result<PathBuf> {
    entry
        .link_name()
        .map_err(|e| InstallError::Archive(format!("invalid link target: {}", e)))?
        .map(|t| t.into_owned())
        .ok_or_else(|| {
            InstallError::Archive(format!("link entry without target: {}", path.display()))
        })
}

/// Hardlink targets name another archive member, so they get the same prefix
/// strip as entry paths.
fn hardlink_source<R: std::io::Read>(
    entry: &tar::Entry<'_, R>,
    path: &Path,
    dest: &Path,
) -> Result<PathBuf> {
    let target = link_target(entry, path)?;
    match strip_first_component(&target)? {
        Some(stripped) => Ok(dest.join(stripped)),
        None => Err(InstallError::Archive(format!(
            "hardlink to the archive root: {}",
            path.display()
        ))),
    }
}

/// Symlink targets are relative to the link's own directory.
fn check_symlink_target<R: std::io::Read>(
    entry: &tar::Entry<'_, R>,
    path: &Path,
    stripped: &Path,
) -> Result<()> {
    let target = link_target(entry, path)?;
    let base = stripped.parent().unwrap_or(Path::new(""));
    if symlink_stays_inside(base, &target) {
        Ok(())
    } else {
        Err(InstallError::Archive(format!(
            "link escapes destination: {} -> {}",
            path.display(),
            target.display()
        )))
    }
}

/// Lexically resolve `target` from `base` (both relative to the unpack root)
/// and report whether it never climbs above that root.
fn symlink_stays_inside(base: &Path, target: &Path) -> bool {
    let mut depth = base
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .count();
    for component in target.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return false;
                }
                depth -= 1;
            }
            Component::RootDir | Component::Prefix(_) => return false,
        }
    }
    true
}

/// True if `bytes` start with the gzip magic number.
pub fn looks_like_gzip(bytes: &[u8]) -> bool {
    bytes.starts_with(&[0x1f, 0x8b])
}
