//! `keg info [name]` – show one formula or list all of them.

use anyhow::Result;
use keg_core::descriptor::{FormulaRegistry, PackageDescriptor};
use keg_core::install::InstallLayout;

pub fn run_info(
    registry: &FormulaRegistry,
    name: Option<&str>,
    json: bool,
    layout: &InstallLayout,
) -> Result<()> {
    let Some(name) = name else {
        if json {
            let all: Vec<&PackageDescriptor> = registry.iter().collect();
            println!("{}", serde_json::to_string_pretty(&all)?);
        } else {
            println!("{:<24} {:<10} {}", "NAME", "VERSION", "INSTALLED");
            for d in registry.iter() {
                let installed = layout.binary_path(d).is_file();
                println!(
                    "{:<24} {:<10} {}",
                    d.name,
                    d.version.as_deref().unwrap_or("-"),
                    if installed { "yes" } else { "no" }
                );
            }
        }
        return Ok(());
    };

    let d = registry.get(name)?;
    if json {
        println!("{}", serde_json::to_string_pretty(d)?);
        return Ok(());
    }

    let path = layout.binary_path(d);
    println!("{}: {}", d.name, d.version.as_deref().unwrap_or("(unversioned)"));
    if !d.description.is_empty() {
        println!("{}", d.description);
    }
    if !d.homepage.is_empty() {
        println!("{}", d.homepage);
    }
    println!("License: {}", if d.license.is_empty() { "-" } else { d.license.as_str() });
    println!("Source:  {}", d.url);
    println!("SHA-256: {}", d.sha256);
    let build_deps: Vec<&str> = d.build_dependencies().map(|x| x.name.as_str()).collect();
    if !build_deps.is_empty() {
        println!("Build:   {}", build_deps.join(", "));
    }
    println!(
        "Binary:  {} ({})",
        path.display(),
        if path.is_file() { "installed" } else { "not installed" }
    );
    Ok(())
}
