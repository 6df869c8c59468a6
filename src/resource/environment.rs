//! Environment Schema
//!
//! Declares, per compute unit, which environment variable receives each
//! cross-resource reference. Slots are named; a positional list is not a
//! valid schema.

use super::manifest::{parse_document, DocumentEntries, ManifestFormat};
use crate::error::{CatalogueLoadError, WiringError};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

/// Configuration slot of a compute unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvSlot {
    /// Concrete name of the storage bucket
    BucketName,
    /// Concrete name of the information table
    TableName,
}

impl EnvSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BucketName => "bucket_name",
            Self::TableName => "table_name",
        }
    }
}

impl fmt::Display for EnvSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// slot -> variable name for one compute unit
pub type UnitEnvironment = BTreeMap<EnvSlot, String>;

/// Compute-unit logical id -> named variable slots
#[derive(Debug, Clone, Default)]
pub struct EnvironmentSchema {
    units: BTreeMap<String, UnitEnvironment>,
}

impl EnvironmentSchema {
    pub fn load(path: &Path) -> Result<Self, CatalogueLoadError> {
        let format = ManifestFormat::from_path(path)?;
        let content = std::fs::read_to_string(path).map_err(|source| CatalogueLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, format, &path.display().to_string())
    }

    pub fn parse(
        content: &str,
        format: ManifestFormat,
        origin: &str,
    ) -> Result<Self, CatalogueLoadError> {
        let document: DocumentEntries<String, DocumentEntries<EnvSlot, String>> =
            parse_document(content, format, origin)?;

        let mut units = BTreeMap::new();
        for (unit, slots) in document.0 {
            let mut environment = UnitEnvironment::new();
            for (slot, variable) in slots.0 {
                if environment.insert(slot, variable).is_some() {
                    return Err(CatalogueLoadError::RepeatedKey {
                        key: slot.to_string(),
                        context: format!("unit '{}' of {}", unit, origin),
                    });
                }
            }
            match units.entry(unit) {
                Entry::Vacant(vacant) => {
                    vacant.insert(environment);
                }
                Entry::Occupied(occupied) => {
                    return Err(CatalogueLoadError::RepeatedKey {
                        key: occupied.key().clone(),
                        context: origin.to_string(),
                    });
                }
            }
        }
        Self::from_units(units)
    }

    /// Build a schema, checking every unit's variable names
    fn from_units(units: BTreeMap<String, UnitEnvironment>) -> Result<Self, CatalogueLoadError> {
        for (unit, slots) in &units {
            let mut seen = BTreeSet::new();
            for (slot, variable) in slots {
                if variable.trim().is_empty() {
                    return Err(CatalogueLoadError::EmptyField {
                        field: "variable name",
                        context: format!("slot {} of '{}'", slot, unit),
                    });
                }
                if !seen.insert(variable.as_str()) {
                    return Err(CatalogueLoadError::DuplicateVariable {
                        unit: unit.clone(),
                        variable: variable.clone(),
                    });
                }
            }
        }
        Ok(Self { units })
    }

    /// Variable name bound to `slot` for compute unit `unit`
    pub fn variable(&self, unit: &str, slot: EnvSlot) -> Result<&str, WiringError> {
        let slots = self.units.get(unit).ok_or_else(|| WiringError::UnknownUnit {
            unit: unit.to_string(),
        })?;
        slots
            .get(&slot)
            .map(String::as_str)
            .ok_or_else(|| WiringError::UndeclaredSlot {
                unit: unit.to_string(),
                slot,
            })
    }
}
