//! `keg fetch <name>` – download and verify the source archive only.

use anyhow::{Context, Result};
use keg_core::descriptor::FormulaRegistry;
use keg_core::install::{self, InstallSteps};
use std::fs;
use std::path::Path;

pub fn run_fetch(
    registry: &FormulaRegistry,
    name: &str,
    output: Option<&Path>,
    steps: &dyn InstallSteps,
) -> Result<()> {
    let descriptor = registry.get(name)?;
    let bytes = install::fetch_verified(descriptor, steps)?;
    println!(
        "Verified {} ({} bytes, sha256 {})",
        descriptor.url,
        bytes.len(),
        descriptor.sha256
    );
    if let Some(path) = output {
        fs::write(path, &bytes).with_context(|| format!("write {}", path.display()))?;
        println!("Saved to {}", path.display());
    }
    Ok(())
}
