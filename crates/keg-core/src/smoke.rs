//! Post-install smoke test: the binary must run and exit 0.
//!
//! Output is logged but never asserted on; help text varies between releases.

use crate::descriptor::SmokeTestSpec;
use crate::error::{InstallError, Result};
use crate::toolchain::combined_output;
use std::path::Path;
use std::process::{Command, Stdio};

pub fn smoke_test(binary: &Path, spec: &SmokeTestSpec) -> Result<()> {
    let failure = |reason: String, output: String| InstallError::TestFailure {
        binary: binary.to_path_buf(),
        args: spec.args.clone(),
        reason,
        output,
    };

    tracing::info!(binary = %binary.display(), args = ?spec.args, "running smoke test");
    let out = Command::new(binary)
        .args(&spec.args)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| failure(format!("could not execute: {}", e), String::new()))?;

    if !out.status.success() {
        return Err(failure(
            format!("exited with {}", out.status),
            combined_output(&out),
        ));
    }
    tracing::debug!(stdout_bytes = out.stdout.len(), "smoke test passed");
    Ok(())
}
