//! Provider seam
//!
//! The stack assembler never talks to a cloud provider. It hands
//! [`ResourceSpec`]s to a [`Provisioner`], which declares them and returns
//! handles. [`StackGraph`] is the standard provisioner: it records the
//! declarations so a deployment tool can diff and apply them.
//!
//! # Module Structure
//!
//! - [`graph`] - in-memory declaration graph
//! - [`policy`] - grant -> provider actions

pub mod graph;
pub mod policy;

pub use graph::{DeclaredResource, Grant, StackGraph};
pub use policy::AccessLevel;

use crate::error::{ResourceCreationError, WiringError};
use crate::resource::ResourceType;
use crate::variant::AttributeType;
use serde::Serialize;

/// Position of a resource within its stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ResourceId(pub usize);

/// Handle to a declared resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedResource {
    pub id: ResourceId,
    pub kind: ResourceType,
    pub logical_id: String,
    pub name: String,
}

/// Reference from one declaration to another
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceRef {
    #[serde(skip)]
    pub id: ResourceId,
    pub logical_id: String,
    pub name: String,
}

impl From<&ProvisionedResource> for ResourceRef {
    fn from(resource: &ProvisionedResource) -> Self {
        Self {
            id: resource.id,
            logical_id: resource.logical_id.clone(),
            name: resource.name.clone(),
        }
    }
}

/// Table partition key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartitionKey {
    pub name: String,
    #[serde(rename = "type")]
    pub attribute_type: AttributeType,
}

/// Declaration of one provider resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ResourceSpec {
    Bucket {
        name: String,
    },
    Layer {
        name: String,
        compatible_runtimes: Vec<String>,
        code_asset: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    Lambda {
        name: String,
        runtime: String,
        handler: String,
        code_asset: String,
        layers: Vec<ResourceRef>,
    },
    Table {
        name: String,
        partition_key: PartitionKey,
    },
    Api {
        name: String,
        handler: ResourceRef,
        proxy: bool,
    },
}

impl ResourceSpec {
    pub fn kind(&self) -> ResourceType {
        match self {
            Self::Bucket { .. } => ResourceType::Bucket,
            Self::Layer { .. } => ResourceType::Layer,
            Self::Lambda { .. } => ResourceType::Lambda,
            Self::Table { .. } => ResourceType::Table,
            Self::Api { .. } => ResourceType::Api,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Bucket { name }
            | Self::Layer { name, .. }
            | Self::Lambda { name, .. }
            | Self::Table { name, .. }
            | Self::Api { name, .. } => name,
        }
    }

    /// Resources this declaration refers to
    pub fn dependencies(&self) -> Vec<&ResourceRef> {
        match self {
            Self::Lambda { layers, .. } => layers.iter().collect(),
            Self::Api { handler, .. } => vec![handler],
            Self::Bucket { .. } | Self::Layer { .. } | Self::Table { .. } => Vec::new(),
        }
    }
}

/// Declares resources, their configuration and their permissions
pub trait Provisioner {
    /// Declare a resource and return its handle
    fn create(
        &mut self,
        logical_id: &str,
        spec: ResourceSpec,
    ) -> Result<ProvisionedResource, ResourceCreationError>;

    /// Set one environment variable on a compute unit
    fn set_environment(
        &mut self,
        unit: &ProvisionedResource,
        key: &str,
        value: &str,
    ) -> Result<(), WiringError>;

    /// Allow `grantee` to act on `resource`. Returns false when the same
    /// grant was already present.
    fn grant(
        &mut self,
        grantee: &ProvisionedResource,
        resource: &ProvisionedResource,
        level: AccessLevel,
    ) -> Result<bool, WiringError>;
}
