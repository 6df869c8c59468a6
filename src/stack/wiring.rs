//! Wiring Engine
//!
//! Injects the bucket and table names into the compute unit's environment
//! and grants the compute unit read/write access to both. Every directive
//! writes a disjoint key, so the order they are applied in does not matter.

use super::factory::ProvisionedStack;
use crate::error::WiringError;
use crate::provider::{AccessLevel, ProvisionedResource, Provisioner};
use crate::resource::{EnvSlot, EnvironmentSchema};

/// One environment injection into a compute unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WiringDirective {
    pub source_unit: ProvisionedResource,
    pub target_attribute: String,
    pub value: String,
}

/// One permission for a compute unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantDirective {
    pub grantee: ProvisionedResource,
    pub granted_resource: ProvisionedResource,
    pub access_level: AccessLevel,
}

/// Directives for one stack
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WiringPlan {
    pub wiring: Vec<WiringDirective>,
    pub grants: Vec<GrantDirective>,
}

/// Outcome of applying a plan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WiringReport {
    pub variables_set: usize,
    pub grants_added: usize,
    pub grants_already_present: usize,
}

pub struct WiringEngine<'a> {
    schema: &'a EnvironmentSchema,
}

impl<'a> WiringEngine<'a> {
    /// Slots every compute unit must declare
    pub const REQUIRED_SLOTS: [EnvSlot; 2] = [EnvSlot::BucketName, EnvSlot::TableName];

    pub fn new(schema: &'a EnvironmentSchema) -> Self {
        Self { schema }
    }

    /// Check that `unit` declares every required slot
    pub fn check_unit(&self, unit: &str) -> Result<(), WiringError> {
        for slot in Self::REQUIRED_SLOTS {
            self.schema.variable(unit, slot)?;
        }
        Ok(())
    }

    /// Build the name injections and grants for a created stack
    pub fn plan(&self, stack: &ProvisionedStack) -> Result<WiringPlan, WiringError> {
        let unit = &stack.lambda;
        let bucket_var = self.schema.variable(&unit.logical_id, EnvSlot::BucketName)?;
        let table_var = self.schema.variable(&unit.logical_id, EnvSlot::TableName)?;

        let wiring = vec![
            WiringDirective {
                source_unit: unit.clone(),
                target_attribute: bucket_var.to_string(),
                value: stack.bucket.name.clone(),
            },
            WiringDirective {
                source_unit: unit.clone(),
                target_attribute: table_var.to_string(),
                value: stack.table.name.clone(),
            },
        ];

        let grants = vec![
            GrantDirective {
                grantee: unit.clone(),
                granted_resource: stack.bucket.clone(),
                access_level: AccessLevel::ReadWrite,
            },
            GrantDirective {
                grantee: unit.clone(),
                granted_resource: stack.table.clone(),
                access_level: AccessLevel::ReadWrite,
            },
        ];

        Ok(WiringPlan { wiring, grants })
    }

    /// Apply every directive, stopping at the first failure
    pub fn apply<P: Provisioner>(
        &self,
        plan: &WiringPlan,
        provisioner: &mut P,
    ) -> Result<WiringReport, WiringError> {
        let mut report = apply_wiring(&plan.wiring, provisioner)?;
        let grants = apply_grants(&plan.grants, provisioner)?;
        report.grants_added = grants.grants_added;
        report.grants_already_present = grants.grants_already_present;
        Ok(report)
    }
}

pub fn apply_wiring<P: Provisioner>(
    directives: &[WiringDirective],
    provisioner: &mut P,
) -> Result<WiringReport, WiringError> {
    let mut report = WiringReport::default();
    for directive in directives {
        tracing::debug!(
            "Setting {}={} on '{}'",
            directive.target_attribute,
            directive.value,
            directive.source_unit.name
        );
        provisioner.set_environment(
            &directive.source_unit,
            &directive.target_attribute,
            &directive.value,
        )?;
        report.variables_set += 1;
    }
    Ok(report)
}

pub fn apply_grants<P: Provisioner>(
    directives: &[GrantDirective],
    provisioner: &mut P,
) -> Result<WiringReport, WiringError> {
    let mut report = WiringReport::default();
    for directive in directives {
        tracing::debug!(
            "Granting {} on {} '{}' to '{}'",
            directive.access_level,
            directive.granted_resource.kind,
            directive.granted_resource.name,
            directive.grantee.name
        );
        if provisioner.grant(
            &directive.grantee,
            &directive.granted_resource,
            directive.access_level,
        )? {
            report.grants_added += 1;
        } else {
            report.grants_already_present += 1;
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{ResourceSpec, StackGraph};
    use crate::resource::{ManifestFormat, ResourceType};

    fn schema() -> EnvironmentSchema {
        EnvironmentSchema::parse(
            r#"{ "crud": { "bucket_name": "BUCKET", "table_name": "TABLE" } }"#,
            ManifestFormat::Json,
            "test",
        )
        .unwrap()
    }

    fn stack(graph: &mut StackGraph) -> ProvisionedStack {
        let bucket = graph
            .create("media", ResourceSpec::Bucket { name: "media-bucket".into() })
            .unwrap();
        let lambda = graph
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
            .unwrap();
        let table = graph
            .create(
                "info",
                ResourceSpec::Table {
                    name: "info-table".into(),
                    partition_key: crate::provider::PartitionKey {
                        name: "id".into(),
                        attribute_type: crate::variant::AttributeType::String,
                    },
                },
            )
            .unwrap();
        let api = graph
            .create(
                "api",
                ResourceSpec::Api {
                    name: "api".into(),
                    handler: (&lambda).into(),
                    proxy: false,
                },
            )
            .unwrap();
        ProvisionedStack {
            bucket,
            layer: None,
            lambda,
            table,
            api,
        }
    }

    #[test]
    fn test_plan_injects_bucket_and_table_names() {
        let mut graph = StackGraph::new();
        let stack = stack(&mut graph);
        let schema = schema();
        let engine = WiringEngine::new(&schema);
        let plan = engine.plan(&stack).unwrap();
        let report = engine.apply(&plan, &mut graph).unwrap();

        assert_eq!(report.variables_set, 2);
        assert_eq!(report.grants_added, 2);

        let env = graph.environment(stack.lambda.id).unwrap();
        assert_eq!(env["BUCKET"], "media-bucket");
        assert_eq!(env["TABLE"], "info-table");

        let granted: Vec<_> = graph.grants().iter().map(|g| g.resource_type).collect();
        assert_eq!(granted, vec![ResourceType::Table, ResourceType::Bucket]);
    }

    #[test]
    fn test_reapplying_a_plan_changes_nothing() {
        let mut graph = StackGraph::new();
        let stack = stack(&mut graph);
        let schema = schema();
        let engine = WiringEngine::new(&schema);
        let plan = engine.plan(&stack).unwrap();

        engine.apply(&plan, &mut graph).unwrap();
        let before = graph.clone();
        let report = engine.apply(&plan, &mut graph).unwrap();

        assert_eq!(report.grants_added, 0);
        assert_eq!(report.grants_already_present, 2);
        assert_eq!(graph.resources(), before.resources());
        assert_eq!(graph.grants(), before.grants());
    }

    #[test]
    fn test_wiring_into_non_compute_unit_fails() {
        let mut graph = StackGraph::new();
        let stack = stack(&mut graph);
        let directive = WiringDirective {
            source_unit: stack.table.clone(),
            target_attribute: "X".into(),
            value: "y".into(),
        };
        let err = apply_wiring(&[directive], &mut graph).unwrap_err();
        assert!(matches!(err, WiringError::NotComputeUnit { kind: ResourceType::Table, .. }));
    }

    #[test]
    fn test_check_unit_reports_missing_slot() {
        let schema = EnvironmentSchema::parse(
            r#"{ "crud": { "bucket_name": "BUCKET" } }"#,
            ManifestFormat::Json,
            "partial",
        )
        .unwrap();
        let err = WiringEngine::new(&schema).check_unit("crud").unwrap_err();
        assert_eq!(
            err,
            WiringError::UndeclaredSlot {
                unit: "crud".into(),
                slot: EnvSlot::TableName
            }
        );
    }
}
