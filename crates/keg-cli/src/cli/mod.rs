//! CLI for the keg package installer.

mod commands;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use keg_core::config;
use keg_core::descriptor::FormulaRegistry;
use keg_core::install::{InstallLayout, SystemSteps};
use std::path::{Path, PathBuf};

use commands::{
    run_checksum, run_completions, run_fetch, run_info, run_install, run_lint, run_man,
    run_test, run_uninstall,
};

/// Top-level CLI for keg.
#[derive(Debug, Parser)]
#[command(name = "keg", version)]
#[command(about = "keg: fetch, verify, build and smoke-test formula packages", long_about = None)]
pub struct Cli {
    /// Install prefix; overrides `prefix` in config.toml.
    #[arg(long, global = true, value_name = "DIR")]
    pub prefix: Option<PathBuf>,

    /// Read formulae from this TOML file instead of the built-in set.
    #[arg(long = "file", short = 'f', global = true, value_name = "FILE")]
    pub formula_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch, verify, build and smoke-test a formula, then install its binary.
    Install {
        /// Formula name.
        name: String,
    },

    /// Remove an installed binary.
    Uninstall {
        /// Formula name.
        name: String,
    },

    /// Re-run the smoke test against the installed binary.
    Test {
        /// Formula name.
        name: String,
    },

    /// Download and verify a formula's source archive without building it.
    Fetch {
        /// Formula name.
        name: String,

        /// Write the verified archive here.
        #[arg(long, short = 'o', value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Compute SHA-256 of a file (e.g. a release archive for a new formula).
    Checksum {
        /// Path to the file.
        path: String,
    },

    /// Show a formula, or list all formulae when no name is given.
    Info {
        /// Formula name.
        name: Option<String>,

        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Validate a formula file (schema, digests, duplicate entries).
    Lint {
        /// Path to the formula TOML file.
        path: PathBuf,
    },

    /// Print shell completions for keg.
    Completions {
        /// Target shell.
        shell: clap_complete::Shell,
    },

    /// Print the keg man page (roff).
    Man,
}

/// Config, formulae and install layout shared by the package commands.
struct Session {
    registry: FormulaRegistry,
    layout: InstallLayout,
    steps: SystemSteps,
}

impl Session {
    fn open(prefix: Option<PathBuf>, formula_file: Option<&Path>) -> Result<Self> {
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        let registry = match formula_file {
            Some(path) => FormulaRegistry::load(path)
                .with_context(|| format!("loading formulae from {}", path.display()))?,
            None => FormulaRegistry::builtin().context("loading built-in formulae")?,
        };
        let prefix = match prefix {
            Some(p) => p,
            None => cfg.resolve_prefix()?,
        };
        Ok(Session {
            registry,
            layout: InstallLayout::new(prefix),
            steps: SystemSteps::from_config(&cfg),
        })
    }
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let file = cli.formula_file.as_deref();
        let session = || Session::open(cli.prefix.clone(), file);

        match &cli.command {
            CliCommand::Install { name } => {
                let s = session()?;
                run_install(&s.registry, name, &s.layout, &s.steps)?;
            }
            CliCommand::Uninstall { name } => {
                let s = session()?;
                run_uninstall(&s.registry, name, &s.layout)?;
            }
            CliCommand::Test { name } => {
                let s = session()?;
                run_test(&s.registry, name, &s.layout, &s.steps)?;
            }
            CliCommand::Fetch { name, output } => {
                let s = session()?;
                run_fetch(&s.registry, name, output.as_deref(), &s.steps)?;
            }
            CliCommand::Info { name, json } => {
                let s = session()?;
                run_info(&s.registry, name.as_deref(), *json, &s.layout)?;
            }
            CliCommand::Checksum { path } => run_checksum(Path::new(path))?,
            CliCommand::Lint { path } => run_lint(path)?,
            CliCommand::Completions { shell } => run_completions(*shell, Cli::command())?,
            CliCommand::Man => run_man(Cli::command())?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
