//! `keg uninstall <name>` – remove the installed binary.

use anyhow::Result;
use keg_core::descriptor::FormulaRegistry;
use keg_core::install::{self, InstallLayout};

pub fn run_uninstall(registry: &FormulaRegistry, name: &str, layout: &InstallLayout) -> Result<()> {
    let descriptor = registry.get(name)?;
    let path = layout.binary_path(descriptor);
    if install::uninstall(descriptor, layout)? {
        println!("Uninstalled {} ({})", name, path.display());
    } else {
        println!("{} is not installed", name);
    }
    Ok(())
}
