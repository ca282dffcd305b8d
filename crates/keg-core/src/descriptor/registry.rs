//! Name-keyed set of validated descriptors.

use super::error::DescriptorError;
use super::parse::parse_file;
use super::PackageDescriptor;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Formulae shipped with keg.
const BUILTIN_FORMULAE: &str = include_str!("../../formulae/container-selector.toml");

#[derive(Debug, Clone, Default)]
pub struct FormulaRegistry {
    formulas: BTreeMap<String, PackageDescriptor>,
}

impl FormulaRegistry {
    /// Parse and validate every `[[formula]]` in `text`.
    ///
    /// A name that appears more than once is rejected with
    /// [`DescriptorError::Duplicate`], even if the entries are identical.
    pub fn from_toml_str(text: &str) -> Result<Self, DescriptorError> {
        let file = parse_file(text)?;
        if file.formula.is_empty() {
            return Err(DescriptorError::Empty);
        }

        let mut seen: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for raw in &file.formula {
            seen.entry(raw.name.trim().to_string())
                .or_default()
                .push(raw.sha256.trim().to_ascii_lowercase());
        }
        if let Some((name, hashes)) = seen.into_iter().find(|(_, h)| h.len() > 1) {
            return Err(DescriptorError::Duplicate { name, hashes });
        }

        let mut formulas = BTreeMap::new();
        for raw in file.formula {
            let d = raw.validate()?;
            formulas.insert(d.name.clone(), d);
        }
        Ok(FormulaRegistry { formulas })
    }

    pub fn load(path: &Path) -> Result<Self, DescriptorError> {
        let text = fs::read_to_string(path).map_err(|source| DescriptorError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Registry of the formulae compiled into keg.
    pub fn builtin() -> Result<Self, DescriptorError> {
        Self::from_toml_str(BUILTIN_FORMULAE)
    }

    pub fn get(&self, name: &str) -> Result<&PackageDescriptor, DescriptorError> {
        self.formulas
            .get(name)
            .ok_or_else(|| DescriptorError::NotFound(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.formulas.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PackageDescriptor> {
        self.formulas.values()
    }

    pub fn len(&self) -> usize {
        self.formulas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formulas.is_empty()
    }
}
