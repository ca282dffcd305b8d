//! Package descriptors ("formulae").
//!
//! A descriptor says where a release archive lives, what it must hash to, and
//! how to build and smoke-test the single executable it produces. Descriptors
//! are authored as TOML (`[[formula]]` tables) and validated into
//! [`PackageDescriptor`] once at load time; after that they are immutable.

mod error;
mod parse;
mod registry;
mod version;

pub use error::DescriptorError;
pub use registry::FormulaRegistry;
pub use version::version_from_url;

use crate::checksum::Sha256Digest;
use serde::{Deserialize, Serialize, Serializer};
use std::path::{Path, PathBuf};

/// Build toolchain a formula declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Toolchain {
    #[default]
    Go,
}

impl Toolchain {
    /// Name of the build dependency that must be declared for this toolchain.
    pub fn dependency_name(self) -> &'static str {
        match self {
            Toolchain::Go => "go",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    Build,
    #[default]
    Runtime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    #[serde(default)]
    pub kind: DependencyKind,
}

/// How the executable is produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildSpec {
    pub toolchain: Toolchain,
    /// Install-prefix-relative path of the produced executable.
    pub output: PathBuf,
    /// Linker flags passed through to the toolchain.
    pub ldflags: String,
}

/// Post-install check: run the binary with `args` and require exit 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SmokeTestSpec {
    pub args: Vec<String>,
}

impl Default for SmokeTestSpec {
    fn default() -> Self {
        Self {
            args: vec!["--help".to_string()],
        }
    }
}

/// A validated package descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageDescriptor {
    pub name: String,
    pub description: String,
    pub homepage: String,
    pub url: String,
    #[serde(serialize_with = "serialize_digest")]
    pub sha256: Sha256Digest,
    pub license: String,
    pub version: Option<String>,
    pub depends_on: Vec<Dependency>,
    pub build: BuildSpec,
    pub test: SmokeTestSpec,
}

fn serialize_digest<S: Serializer>(d: &Sha256Digest, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&d.to_hex())
}

impl PackageDescriptor {
    /// File name of the produced executable (last component of `build.output`).
    pub fn binary_name(&self) -> &str {
        self.build
            .output
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.name)
    }

    /// Absolute path of the installed executable under `prefix`.
    pub fn installed_path(&self, prefix: &Path) -> PathBuf {
        prefix.join(&self.build.output)
    }

    pub fn build_dependencies(&self) -> impl Iterator<Item = &Dependency> {
        self.depends_on
            .iter()
            .filter(|d| d.kind == DependencyKind::Build)
    }
}
