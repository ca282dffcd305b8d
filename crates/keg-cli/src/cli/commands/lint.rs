//! `keg lint <file>` – validate a formula file.

use anyhow::Result;
use keg_core::descriptor::FormulaRegistry;
use std::path::Path;

pub fn run_lint(path: &Path) -> Result<()> {
    let registry = FormulaRegistry::load(path)?;
    for d in registry.iter() {
        println!(
            "{}: ok ({}, installs {} at {})",
            d.name,
            d.version.as_deref().unwrap_or("unversioned"),
            d.binary_name(),
            d.build.output.display()
        );
    }
    let names: Vec<&str> = registry.names().collect();
    println!(
        "{}: {} formula(e) valid: {}",
        path.display(),
        registry.len(),
        names.join(", ")
    );
    Ok(())
}
