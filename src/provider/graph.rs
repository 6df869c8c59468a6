//! Stack Graph
//!
//! Records declarations in creation order. Environment variables are kept
//! in sorted maps and grants in a sorted set, so the serialized graph is
//! identical for identical inputs.

use super::policy::{self, AccessLevel};
use super::{ProvisionedResource, Provisioner, ResourceId, ResourceSpec};
use crate::error::{ResourceCreationError, WiringError};
use crate::resource::ResourceType;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// A resource as it will be handed to the deployment tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeclaredResource {
    pub logical_id: String,
    #[serde(flatten)]
    pub spec: ResourceSpec,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
}

/// Permission for a compute unit on a bucket or table
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Grant {
    pub grantee: String,
    pub resource: String,
    pub resource_type: ResourceType,
    pub access: AccessLevel,
    pub actions: Vec<&'static str>,
}

/// In-memory provisioner
#[derive(Debug, Clone, Default, Serialize)]
pub struct StackGraph {
    resources: Vec<DeclaredResource>,
    grants: BTreeSet<Grant>,
}

impl StackGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declarations in creation order
    pub fn resources(&self) -> &[DeclaredResource] {
        &self.resources
    }

    pub fn resources_of(&self, kind: ResourceType) -> Vec<&DeclaredResource> {
        self.resources
            .iter()
            .filter(|r| r.spec.kind() == kind)
            .collect()
    }

    pub fn grants(&self) -> &BTreeSet<Grant> {
        &self.grants
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Environment of a declared resource
    pub fn environment(&self, id: ResourceId) -> Option<&BTreeMap<String, String>> {
        self.resources.get(id.0).map(|r| &r.environment)
    }

    /// Look up a handle, checking that it belongs to this graph
    fn declared(&self, handle: &ProvisionedResource) -> Result<&DeclaredResource, WiringError> {
        self.resources
            .get(handle.id.0)
            .filter(|r| r.spec.name() == handle.name && r.spec.kind() == handle.kind)
            .ok_or_else(|| WiringError::UnknownResource {
                name: handle.name.clone(),
            })
    }
}

impl Provisioner for StackGraph {
    fn create(
        &mut self,
        logical_id: &str,
        spec: ResourceSpec,
    ) -> Result<ProvisionedResource, ResourceCreationError> {
        let kind = spec.kind();

        if self
            .resources
            .iter()
            .any(|r| r.spec.kind() == kind && r.spec.name() == spec.name())
        {
            return Err(ResourceCreationError::NameConflict {
                kind,
                name: spec.name().to_string(),
            });
        }

        for dependency in spec.dependencies() {
            let known = self
                .resources
                .get(dependency.id.0)
                .is_some_and(|r| r.spec.name() == dependency.name);
            if !known {
                return Err(ResourceCreationError::MissingDependency {
                    kind,
                    logical_id: logical_id.to_string(),
                });
            }
        }

        let handle = ProvisionedResource {
            id: ResourceId(self.resources.len()),
            kind,
            logical_id: logical_id.to_string(),
            name: spec.name().to_string(),
        };

        self.resources.push(DeclaredResource {
            logical_id: logical_id.to_string(),
            spec,
            environment: BTreeMap::new(),
        });

        Ok(handle)
    }

    fn set_environment(
        &mut self,
        unit: &ProvisionedResource,
        key: &str,
        value: &str,
    ) -> Result<(), WiringError> {
        let declared = self.declared(unit)?;
        if declared.spec.kind() != ResourceType::Lambda {
            return Err(WiringError::NotComputeUnit {
                name: unit.name.clone(),
                kind: unit.kind,
            });
        }

        self.resources[unit.id.0]
            .environment
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn grant(
        &mut self,
        grantee: &ProvisionedResource,
        resource: &ProvisionedResource,
        level: AccessLevel,
    ) -> Result<bool, WiringError> {
        if self.declared(grantee)?.spec.kind() != ResourceType::Lambda {
            return Err(WiringError::NotComputeUnit {
                name: grantee.name.clone(),
                kind: grantee.kind,
            });
        }

        let resource_type = self.declared(resource)?.spec.kind();
        let actions =
            policy::actions(resource_type, level).ok_or_else(|| WiringError::UngrantableResource {
                name: resource.name.clone(),
                kind: resource_type,
            })?;

        Ok(self.grants.insert(Grant {
            grantee: grantee.name.clone(),
            resource: resource.name.clone(),
            resource_type,
            access: level,
            actions,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket(graph: &mut StackGraph, name: &str) -> ProvisionedResource {
        graph
            .create("bucket", ResourceSpec::Bucket { name: name.into() })
            .unwrap()
    }

    fn lambda(graph: &mut StackGraph) -> ProvisionedResource {
        graph
            .create(
                "crud",
                ResourceSpec::Lambda {
                    name: "crud-fn".into(),
                    runtime: "python3.8".into(),
                    handler: "crud.lambda_handler".into(),
                    code_asset: "lambdas".into(),
                    layers: Vec::new(),
                },
            )
            .unwrap()
    }

    #[test]
    fn test_create_assigns_sequential_ids() {
        let mut graph = StackGraph::new();
        let first = bucket(&mut graph, "a");
        let second = bucket(&mut graph, "b");
        assert_eq!(first.id, ResourceId(0));
        assert_eq!(second.id, ResourceId(1));
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_name_conflict_within_kind() {
        let mut graph = StackGraph::new();
        bucket(&mut graph, "media");
        let err = graph
            .create("other", ResourceSpec::Bucket { name: "media".into() })
            .unwrap_err();
        assert_eq!(
            err,
            ResourceCreationError::NameConflict {
                kind: ResourceType::Bucket,
                name: "media".into()
            }
        );
    }

    #[test]
    fn test_dependency_must_be_declared() {
        let mut graph = StackGraph::new();
        let mut other = StackGraph::new();
        let foreign = lambda(&mut other);
        let err = graph
            .create(
                "api",
                ResourceSpec::Api {
                    name: "api".into(),
                    handler: (&foreign).into(),
                    proxy: false,
                },
            )
            .unwrap_err();
        assert!(matches!(err, ResourceCreationError::MissingDependency { .. }));
        assert!(graph.is_empty());
    }

    #[test]
    fn test_environment_only_on_compute_units() {
        let mut graph = StackGraph::new();
        let media = bucket(&mut graph, "media");
        let err = graph.set_environment(&media, "KEY", "value").unwrap_err();
        assert!(matches!(err, WiringError::NotComputeUnit { .. }));
    }

    #[test]
    fn test_environment_last_write_wins() {
        let mut graph = StackGraph::new();
        let unit = lambda(&mut graph);
        graph.set_environment(&unit, "KEY", "one").unwrap();
        graph.set_environment(&unit, "KEY", "two").unwrap();
        let env = graph.environment(unit.id).unwrap();
        assert_eq!(env.len(), 1);
        assert_eq!(env["KEY"], "two");
    }

    #[test]
    fn test_grant_is_idempotent() {
        let mut graph = StackGraph::new();
        let media = bucket(&mut graph, "media");
        let unit = lambda(&mut graph);
        assert!(graph.grant(&unit, &media, AccessLevel::ReadWrite).unwrap());
        assert!(!graph.grant(&unit, &media, AccessLevel::ReadWrite).unwrap());
        assert_eq!(graph.grants().len(), 1);
    }

    #[test]
    fn test_grant_on_compute_unit_is_rejected() {
        let mut graph = StackGraph::new();
        let unit = lambda(&mut graph);
        let err = graph.grant(&unit, &unit, AccessLevel::Read).unwrap_err();
        assert!(matches!(err, WiringError::UngrantableResource { .. }));
    }
}
