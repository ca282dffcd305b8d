//! Install pipeline.
//!
//! fetch → verify → unpack → build → smoke test → place. The digest is checked
//! before anything is written to disk, and the binary is only moved into the
//! prefix after its smoke test passes, so a failed attempt never leaves an
//! executable at the declared path. No step is retried.

mod layout;
mod steps;

pub use layout::{temp_path, InstallLayout, BUILD_DIR, TEMP_SUFFIX};
pub use steps::{verify_digest, InstallSteps, SystemSteps};

use crate::archive;
use crate::descriptor::PackageDescriptor;
use crate::error::{InstallError, Result};
use std::path::{Path, PathBuf};

/// What a successful install produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub name: String,
    pub version: Option<String>,
    /// Installed executable.
    pub path: PathBuf,
    pub sha256: String,
    pub archive_bytes: usize,
}

/// Install `descriptor` into `layout` using `steps`.
pub fn install<S>(
    descriptor: &PackageDescriptor,
    layout: &InstallLayout,
    steps: &S,
) -> Result<InstallReport>
where
    S: InstallSteps + ?Sized,
{
    let name = descriptor.name.as_str();
    tracing::info!(
        name,
        version = descriptor.version.as_deref().unwrap_or("unknown"),
        url = %descriptor.url,
        "install started"
    );

    let bytes = steps.fetch(&descriptor.url)?;
    steps.verify(&bytes, &descriptor.sha256)?;
    if !archive::looks_like_gzip(&bytes) {
        return Err(InstallError::Archive(
            "source archive is not gzip-compressed (.tar.gz expected)".to_string(),
        ));
    }

    let build_root = layout.build_root();
    std::fs::create_dir_all(&build_root)
        .map_err(|e| InstallError::io(format!("create {}", build_root.display()), e))?;
    let work = tempfile::Builder::new()
        .prefix(&format!("{}-", name))
        .tempdir_in(&build_root)
        .map_err(|e| InstallError::io("create build directory", e))?;
    let result = build_and_place(descriptor, layout, steps, &bytes, work.path());

    if let Err(e) = work.close() {
        tracing::warn!("failed to remove build directory: {}", e);
    }
    // Only succeeds once no other install is using it.
    let _ = std::fs::remove_dir(&build_root);

    let dest = result?;
    tracing::info!(name, path = %dest.display(), "install finished");
    Ok(InstallReport {
        name: descriptor.name.clone(),
        version: descriptor.version.clone(),
        path: dest,
        sha256: descriptor.sha256.to_hex(),
        archive_bytes: bytes.len(),
    })
}

/// Unpack, build, smoke test and place inside the build directory `work`.
fn build_and_place<S>(
    descriptor: &PackageDescriptor,
    layout: &InstallLayout,
    steps: &S,
    bytes: &[u8],
    work: &Path,
) -> Result<PathBuf>
where
    S: InstallSteps + ?Sized,
{
    let source_dir = work.join("src");
    archive::unpack_tar_gz(bytes, &source_dir)?;

    let staged = work.join("stage").join(&descriptor.build.output);
    steps.build(&descriptor.build, &source_dir, &staged)?;
    if !staged.is_file() {
        return Err(InstallError::Build {
            reason: format!("toolchain produced no file at {}", staged.display()),
            output: String::new(),
        });
    }

    steps.smoke_test(&staged, &descriptor.test)?;

    let dest = layout.binary_path(descriptor);
    layout.place(&staged, &dest)?;
    Ok(dest)
}

/// Re-run the smoke test against an already installed binary.
pub fn test_installed<S>(
    descriptor: &PackageDescriptor,
    layout: &InstallLayout,
    steps: &S,
) -> Result<PathBuf>
where
    S: InstallSteps + ?Sized,
{
    let path = layout.binary_path(descriptor);
    if !path.is_file() {
        return Err(InstallError::TestFailure {
            binary: path,
            args: descriptor.test.args.clone(),
            reason: format!("{} is not installed", descriptor.name),
            output: String::new(),
        });
    }
    steps.smoke_test(&path, &descriptor.test)?;
    Ok(path)
}

/// Fetch and verify only; returns the archive bytes.
pub fn fetch_verified<S>(descriptor: &PackageDescriptor, steps: &S) -> Result<Vec<u8>>
where
    S: InstallSteps + ?Sized,
{
    let bytes = steps.fetch(&descriptor.url)?;
    steps.verify(&bytes, &descriptor.sha256)?;
    Ok(bytes)
}

/// Remove the installed binary. Returns false if it wasn't installed.
pub fn uninstall(descriptor: &PackageDescriptor, layout: &InstallLayout) -> Result<bool> {
    layout.remove(descriptor)
}

#[cfg(test)]
mod tests;
