//! The four install steps as a trait seam.

use crate::checksum::{sha256_bytes, Sha256Digest};
use crate::config::{FetchConfig, KegConfig};
use crate::descriptor::{BuildSpec, SmokeTestSpec};
use crate::error::{InstallError, Result};
use crate::{fetch, smoke, toolchain};
use std::path::Path;

/// fetch → verify → build → smoke test. `SystemSteps` is the real thing;
/// tests swap individual steps.
pub trait InstallSteps {
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;

    fn verify(&self, bytes: &[u8], expected: &Sha256Digest) -> Result<()> {
        verify_digest(bytes, expected)
    }

    fn build(&self, spec: &BuildSpec, source_dir: &Path, output: &Path) -> Result<()>;

    fn smoke_test(&self, binary: &Path, spec: &SmokeTestSpec) -> Result<()>;
}

/// SHA-256 `bytes` and compare against `expected` byte for byte.
pub fn verify_digest(bytes: &[u8], expected: &Sha256Digest) -> Result<()> {
    let actual = sha256_bytes(bytes);
    if actual.as_bytes() != expected.as_bytes() {
        tracing::warn!(%expected, %actual, "sha256 mismatch");
        return Err(InstallError::Integrity {
            expected: expected.to_hex(),
            actual: actual.to_hex(),
        });
    }
    tracing::debug!(sha256 = %actual, "sha256 verified");
    Ok(())
}

/// Steps backed by libcurl, the configured Go toolchain and real processes.
#[derive(Debug, Clone)]
pub struct SystemSteps {
    pub fetch: FetchConfig,
    pub go_bin: String,
}

impl SystemSteps {
    pub fn from_config(cfg: &KegConfig) -> Self {
        Self {
            fetch: cfg.fetch.clone(),
            go_bin: cfg.resolve_go_bin(),
        }
    }
}

impl InstallSteps for SystemSteps {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        fetch::fetch(url, &self.fetch)
    }

    fn build(&self, spec: &BuildSpec, source_dir: &Path, output: &Path) -> Result<()> {
        toolchain::build(&self.go_bin, spec, source_dir, output)
    }

    fn smoke_test(&self, binary: &Path, spec: &SmokeTestSpec) -> Result<()> {
        smoke::smoke_test(binary, spec)
    }
}
