//! Install prefix and binary placement.
//!
//! Binaries are copied next to their destination as `<name>.part`, synced,
//! then renamed over the destination so a reinstall never leaves a
//! half-written executable behind.

use crate::descriptor::PackageDescriptor;
use crate::error::{InstallError, Result};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

/// Directory under the prefix that holds per-install build trees.
pub const BUILD_DIR: &str = ".keg-build";

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `bin/tool` → `bin/tool.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    prefix: PathBuf,
}

impl InstallLayout {
    pub fn new(prefix: impl Into<PathBuf>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    /// Parent of the per-install build directories. Keeping it under the
    /// prefix puts the staged binary on the same filesystem (and mount
    /// options) as its final location.
    pub fn build_root(&self) -> PathBuf {
        self.prefix.join(BUILD_DIR)
    }

    /// Where `descriptor`'s executable lives once installed.
    pub fn binary_path(&self, descriptor: &PackageDescriptor) -> PathBuf {
        descriptor.installed_path(&self.prefix)
    }

    /// Copy `staged` to `dest` atomically, replacing any existing file.
    pub fn place(&self, staged: &Path, dest: &Path) -> Result<()> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| InstallError::io(format!("create {}", parent.display()), e))?;
        }
        let part = temp_path(dest);
        let io_err = |what: &str, e: io::Error| {
            let _ = fs::remove_file(&part);
            InstallError::io(format!("{} {}", what, part.display()), e)
        };

        fs::copy(staged, &part).map_err(|e| io_err("copy to", e))?;
        set_executable(&part).map_err(|e| io_err("chmod", e))?;
        File::open(&part)
            .and_then(|f| f.sync_all())
            .map_err(|e| io_err("sync", e))?;
        fs::rename(&part, dest).map_err(|e| io_err("rename", e))?;

        tracing::info!(dest = %dest.display(), "binary installed");
        Ok(())
    }

    /// Delete the installed executable. Returns false if nothing was installed.
    pub fn remove(&self, descriptor: &PackageDescriptor) -> Result<bool> {
        let path = self.binary_path(descriptor);
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "binary removed");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(InstallError::io(format!("remove {}", path.display()), e)),
        }
    }
}

#[cfg(unix)]
fn set_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}
