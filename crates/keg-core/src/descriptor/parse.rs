//! TOML schema for descriptor files and validation into `PackageDescriptor`.

use super::error::DescriptorError;
use super::version::version_from_url;
use super::{BuildSpec, Dependency, DependencyKind, PackageDescriptor, SmokeTestSpec, Toolchain};
use crate::checksum::Sha256Digest;
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};
use url::Url;

const DEFAULT_LDFLAGS: &str = "-s -w";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct DescriptorFile {
    #[serde(default)]
    pub formula: Vec<RawFormula>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct RawFormula {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub homepage: String,
    pub url: String,
    pub sha256: String,
    #[serde(default)]
    pub license: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub depends_on: Vec<Dependency>,
    #[serde(default)]
    pub build: Option<RawBuild>,
    #[serde(default)]
    pub test: Option<RawTest>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct RawBuild {
    #[serde(default)]
    pub toolchain: Toolchain,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub ldflags: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct RawTest {
    pub args: Vec<String>,
}

pub(super) fn parse_file(text: &str) -> Result<DescriptorFile, DescriptorError> {
    toml::from_str(text).map_err(|e| DescriptorError::Toml(e.to_string()))
}

/// Lowercase ASCII letters/digits plus `._+-`, starting with a letter or digit.
fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c.is_ascii_digit() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || "._+-".contains(c))
}

fn validate_output(name: &str, output: &str) -> Result<PathBuf, DescriptorError> {
    let invalid = |reason: &str| DescriptorError::InvalidOutput {
        name: name.to_string(),
        output: output.to_string(),
        reason: reason.to_string(),
    };
    let path = Path::new(output);
    if output.trim().is_empty() {
        return Err(invalid("empty path"));
    }
    for component in path.components() {
        match component {
            Component::Normal(_) => {}
            Component::CurDir => {}
            Component::ParentDir => return Err(invalid("must not contain '..'")),
            Component::RootDir | Component::Prefix(_) => {
                return Err(invalid("must be relative to the install prefix"))
            }
        }
    }
    if path.file_name().is_none() {
        return Err(invalid("must name a file"));
    }
    Ok(path.components().collect())
}

fn validate_url(name: &str, raw: &str) -> Result<Url, DescriptorError> {
    let invalid = |reason: String| DescriptorError::InvalidUrl {
        name: name.to_string(),
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" | "file" => Ok(url),
        other => Err(invalid(format!("unsupported scheme {:?}", other))),
    }
}

impl RawFormula {
    pub(super) fn validate(self) -> Result<PackageDescriptor, DescriptorError> {
        let name = self.name.trim().to_string();
        if !is_valid_name(&name) {
            return Err(DescriptorError::InvalidName(self.name));
        }

        let url = validate_url(&name, self.url.trim())?;

        let sha256: Sha256Digest =
            self.sha256
                .parse()
                .map_err(|_| DescriptorError::InvalidSha256 {
                    name: name.clone(),
                    value: self.sha256.clone(),
                })?;

        let raw_build = self.build.unwrap_or(RawBuild {
            toolchain: Toolchain::default(),
            output: None,
            ldflags: None,
        });
        let output = match raw_build.output {
            Some(o) => validate_output(&name, &o)?,
            None => Path::new("bin").join(&name),
        };
        let build = BuildSpec {
            toolchain: raw_build.toolchain,
            output,
            ldflags: raw_build
                .ldflags
                .unwrap_or_else(|| DEFAULT_LDFLAGS.to_string()),
        };

        let dep = build.toolchain.dependency_name();
        let declared = self
            .depends_on
            .iter()
            .any(|d| d.kind == DependencyKind::Build && d.name == dep);
        if !declared {
            return Err(DescriptorError::MissingBuildDependency {
                name,
                toolchain: dep.to_string(),
            });
        }

        let test = match self.test {
            Some(t) if t.args.is_empty() => {
                return Err(DescriptorError::EmptySmokeTest { name });
            }
            Some(t) => SmokeTestSpec { args: t.args },
            None => SmokeTestSpec::default(),
        };

        let version = self
            .version
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .or_else(|| version_from_url(&url));

        Ok(PackageDescriptor {
            name,
            description: self.description,
            homepage: self.homepage,
            url: url.to_string(),
            sha256,
            license: self.license,
            version,
            depends_on: self.depends_on,
            build,
            test,
        })
    }
}
