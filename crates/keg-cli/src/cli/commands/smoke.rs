//! `keg test <name>` – run the smoke test against the installed binary.

use anyhow::Result;
use keg_core::descriptor::FormulaRegistry;
use keg_core::install::{self, InstallLayout, InstallSteps};

pub fn run_test(
    registry: &FormulaRegistry,
    name: &str,
    layout: &InstallLayout,
    steps: &dyn InstallSteps,
) -> Result<()> {
    let descriptor = registry.get(name)?;
    let path = install::test_installed(descriptor, layout, steps)?;
    println!(
        "{} {}: ok",
        path.display(),
        descriptor.test.args.join(" ")
    );
    Ok(())
}
