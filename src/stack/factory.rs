//! Resource Factory
//!
//! Declares the stack's resources in dependency order: bucket, optional
//! layer, compute unit, table, front door. The order comes from the
//! blueprint, never from catalogue iteration.

use crate::error::ResourceCreationError;
use crate::provider::{PartitionKey, ProvisionedResource, Provisioner, ResourceRef, ResourceSpec};
use crate::resource::{ResolvedNames, ResourceDescriptor};
use crate::variant::{AttributeType, Blueprint, LAMBDA_CODE_ASSET, LAMBDA_RUNTIME};

/// Handles of every resource in one stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedStack {
    pub bucket: ProvisionedResource,
    pub layer: Option<ProvisionedResource>,
    pub lambda: ProvisionedResource,
    pub table: ProvisionedResource,
    pub api: ProvisionedResource,
}

pub struct ResourceFactory<'a> {
    blueprint: &'a Blueprint,
}

impl<'a> ResourceFactory<'a> {
    pub fn new(blueprint: &'a Blueprint) -> Self {
        Self { blueprint }
    }

    /// Declare every resource. The first failure stops creation.
    pub fn build<P: Provisioner>(
        &self,
        names: &ResolvedNames,
        provisioner: &mut P,
    ) -> Result<ProvisionedStack, ResourceCreationError> {
        let bucket = create(
            provisioner,
            &names.bucket,
            ResourceSpec::Bucket {
                name: names.bucket.concrete_name.clone(),
            },
        )?;

        let layer = match (&self.blueprint.layer, &names.layer) {
            (Some(layer_bp), Some(descriptor)) => Some(create(
                provisioner,
                descriptor,
                ResourceSpec::Layer {
                    name: descriptor.concrete_name.clone(),
                    compatible_runtimes: vec![LAMBDA_RUNTIME.to_string()],
                    code_asset: layer_bp.code_asset.to_string(),
                    description: layer_bp.description.map(str::to_string),
                },
            )?),
            _ => None,
        };

        let lambda = create(
            provisioner,
            &names.lambda,
            ResourceSpec::Lambda {
                name: names.lambda.concrete_name.clone(),
                runtime: LAMBDA_RUNTIME.to_string(),
                handler: self.blueprint.handler(),
                code_asset: LAMBDA_CODE_ASSET.to_string(),
                layers: layer.iter().map(ResourceRef::from).collect(),
            },
        )?;

        let table = create(
            provisioner,
            &names.table,
            ResourceSpec::Table {
                name: names.table.concrete_name.clone(),
                partition_key: PartitionKey {
                    name: self.blueprint.partition_key.to_string(),
                    attribute_type: AttributeType::String,
                },
            },
        )?;

        let api = create(
            provisioner,
            &names.api,
            ResourceSpec::Api {
                name: names.api.concrete_name.clone(),
                handler: (&lambda).into(),
                proxy: false,
            },
        )?;

        Ok(ProvisionedStack {
            bucket,
            layer,
            lambda,
            table,
            api,
        })
    }
}

fn create<P: Provisioner>(
    provisioner: &mut P,
    descriptor: &ResourceDescriptor,
    spec: ResourceSpec,
) -> Result<ProvisionedResource, ResourceCreationError> {
    tracing::info!(
        "Creating {} '{}' as '{}'",
        descriptor.kind,
        descriptor.logical_id,
        descriptor.concrete_name
    );
    provisioner
        .create(&descriptor.logical_id, spec)
        .inspect_err(|e| {
            tracing::error!("Failed to create {} '{}': {}", descriptor.kind, descriptor.logical_id, e)
        })
}
