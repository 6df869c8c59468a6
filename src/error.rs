//! Error taxonomy for stack assembly
//!
//! Every error here is fatal for the stack being assembled. Nothing is
//! retried: infrastructure declarations are not safe to replay without
//! inspecting remote state.

use crate::resource::{EnvSlot, ResourceType};
use std::path::PathBuf;
use thiserror::Error;

/// Malformed or missing manifest
#[derive(Error, Debug)]
pub enum CatalogueLoadError {
    #[error("Failed to read manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid YAML in {origin}: {source}")]
    Yaml {
        origin: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Unsupported manifest extension: {path}")]
    UnsupportedFormat { path: PathBuf },

    #[error("Manifest not found in {dir} (tried {stem}.json, {stem}.yaml, {stem}.yml)")]
    Missing { dir: PathBuf, stem: String },

    #[error("Unknown resource type '{0}'")]
    UnknownResourceType(String),

    #[error("Duplicate {kind} entry '{logical_id}'")]
    DuplicateEntry {
        kind: ResourceType,
        logical_id: String,
    },

    #[error("Empty {field} in {context}")]
    EmptyField {
        field: &'static str,
        context: String,
    },

    #[error("Key '{key}' appears more than once in {context}")]
    RepeatedKey { key: String, context: String },

    #[error("Variable '{variable}' is assigned to more than one slot of '{unit}'")]
    DuplicateVariable { unit: String, variable: String },
}

/// A logical id is absent from the catalogue
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("No {kind} named '{logical_id}' in the resource catalogue")]
pub struct NameResolutionError {
    pub kind: ResourceType,
    pub logical_id: String,
}

/// The provisioner refused to declare a resource
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResourceCreationError {
    #[error("A {kind} named '{name}' is already declared in this stack")]
    NameConflict { kind: ResourceType, name: String },

    #[error("{kind} '{logical_id}' depends on an undeclared resource")]
    MissingDependency {
        kind: ResourceType,
        logical_id: String,
    },

    #[error("Provisioner rejected {kind} '{logical_id}': {reason}")]
    Rejected {
        kind: ResourceType,
        logical_id: String,
        reason: String,
    },
}

/// A wiring or grant directive could not be applied
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WiringError {
    #[error("Compute unit '{unit}' has no environment schema")]
    UnknownUnit { unit: String },

    #[error("Compute unit '{unit}' does not declare the {slot} slot")]
    UndeclaredSlot { unit: String, slot: EnvSlot },

    #[error("'{name}' is a {kind}, not a compute unit")]
    NotComputeUnit { name: String, kind: ResourceType },

    #[error("Cannot grant access on {kind} '{name}'")]
    UngrantableResource { name: String, kind: ResourceType },

    #[error("Resource '{name}' is not declared in this stack")]
    UnknownResource { name: String },
}

/// Umbrella error returned by the stack assembler
#[derive(Error, Debug)]
pub enum StackError {
    #[error(transparent)]
    CatalogueLoad(#[from] CatalogueLoadError),

    #[error(transparent)]
    NameResolution(#[from] NameResolutionError),

    #[error(transparent)]
    ResourceCreation(#[from] ResourceCreationError),

    #[error(transparent)]
    Wiring(#[from] WiringError),
}

pub type Result<T, E = StackError> = std::result::Result<T, E>;
