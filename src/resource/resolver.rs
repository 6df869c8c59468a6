//! Name Resolver
//!
//! Resolves every concrete name a variant needs up front, so a missing
//! catalogue entry stops assembly before any resource is declared.

use super::catalogue::{Catalogue, ResourceDescriptor, ResourceType};
use crate::error::NameResolutionError;
use crate::variant::Blueprint;

/// Names required by one stack, all known to exist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedNames {
    pub bucket: ResourceDescriptor,
    pub layer: Option<ResourceDescriptor>,
    pub lambda: ResourceDescriptor,
    pub table: ResourceDescriptor,
    pub api: ResourceDescriptor,
}

/// Uniform (type, logical id) lookup over a catalogue
#[derive(Debug, Clone, Copy)]
pub struct NameResolver<'a> {
    catalogue: &'a Catalogue,
}

impl<'a> NameResolver<'a> {
    pub fn new(catalogue: &'a Catalogue) -> Self {
        Self { catalogue }
    }

    pub fn resolve(
        &self,
        kind: ResourceType,
        logical_id: &str,
    ) -> Result<&'a ResourceDescriptor, NameResolutionError> {
        self.catalogue.descriptor(kind, logical_id)
    }

    /// Resolve bucket, layer, lambda, table and api in that order,
    /// stopping at the first missing entry.
    pub fn resolve_blueprint(
        &self,
        blueprint: &Blueprint,
    ) -> Result<ResolvedNames, NameResolutionError> {
        let bucket = self.resolve(ResourceType::Bucket, blueprint.bucket)?.clone();
        let layer = blueprint
            .layer
            .map(|layer| self.resolve(ResourceType::Layer, layer.logical_id).cloned())
            .transpose()?;
        let lambda = self.resolve(ResourceType::Lambda, blueprint.lambda)?.clone();
        let table = self.resolve(ResourceType::Table, blueprint.table)?.clone();
        let api = self.resolve(ResourceType::Api, blueprint.api)?.clone();

        tracing::debug!(
            "Resolved all names for {}: bucket={}, lambda={}, table={}, api={}",
            blueprint.stack_id,
            bucket.concrete_name,
            lambda.concrete_name,
            table.concrete_name,
            api.concrete_name
        );

        Ok(ResolvedNames {
            bucket,
            layer,
            lambda,
            table,
            api,
        })
    }
}
