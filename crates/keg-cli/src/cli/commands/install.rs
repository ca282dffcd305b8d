//! `keg install <name>` – fetch, verify, build, smoke-test and place a binary.

use anyhow::Result;
use keg_core::descriptor::FormulaRegistry;
use keg_core::install::{self, InstallLayout, InstallSteps};

pub fn run_install(
    registry: &FormulaRegistry,
    name: &str,
    layout: &InstallLayout,
    steps: &dyn InstallSteps,
) -> Result<()> {
    let descriptor = registry.get(name)?;
    println!("==> Fetching {}", descriptor.url);
    let report = install::install(descriptor, layout, steps)?;
    match &report.version {
        Some(v) => println!("Installed {} {} to {}", report.name, v, report.path.display()),
        None => println!("Installed {} to {}", report.name, report.path.display()),
    }
    Ok(())
}
