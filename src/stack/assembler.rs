//! Stack Assembler
//!
//! One pass per backend variant: resolve names, check the environment
//! schema, create resources, wire and grant, build routes. Nothing is
//! declared until every name and slot is known to exist.

use super::factory::{ProvisionedStack, ResourceFactory};
use super::router::{ApiRouter, RouteTree};
use super::wiring::{WiringEngine, WiringReport};
use crate::error::{CatalogueLoadError, Result};
use crate::provider::{Provisioner, StackGraph};
use crate::resource::{Manifest, NameResolver};
use crate::variant::{Blueprint, Variant};
use serde::Serialize;
use std::path::Path;

/// Result of assembling into an arbitrary provisioner
#[derive(Debug, Clone)]
pub struct Assembly {
    pub resources: ProvisionedStack,
    pub wiring: WiringReport,
    pub routes: RouteTree,
}

/// Declared stack, ready for the deployment tool
#[derive(Debug, Clone, Serialize)]
pub struct AssembledStack {
    pub stack_id: String,
    pub variant: Variant,
    #[serde(flatten)]
    pub graph: StackGraph,
    pub api: RouteTree,
}

impl AssembledStack {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_yaml(&self) -> serde_yaml::Result<String> {
        serde_yaml::to_string(self)
    }
}

pub struct StackAssembler<'a> {
    variant: Variant,
    blueprint: &'a Blueprint,
    manifest: &'a Manifest,
}

impl<'a> StackAssembler<'a> {
    pub fn new(variant: Variant, manifest: &'a Manifest) -> Self {
        Self {
            variant,
            blueprint: variant.blueprint(),
            manifest,
        }
    }

    /// Assemble against a custom blueprint
    pub fn with_blueprint(variant: Variant, blueprint: &'a Blueprint, manifest: &'a Manifest) -> Self {
        Self {
            variant,
            blueprint,
            manifest,
        }
    }

    /// Assemble into a fresh [`StackGraph`]
    pub fn assemble(&self) -> Result<AssembledStack> {
        let mut graph = StackGraph::new();
        let assembly = self.assemble_into(&mut graph)?;
        Ok(AssembledStack {
            stack_id: self.blueprint.stack_id.to_string(),
            variant: self.variant,
            graph,
            api: assembly.routes,
        })
    }

    /// Assemble into `provisioner`. On error, no step after the failing
    /// one has run.
    pub fn assemble_into<P: Provisioner>(&self, provisioner: &mut P) -> Result<Assembly> {
        tracing::info!("Constructing {} ({})", self.blueprint.stack_id, self.variant);

        let names = NameResolver::new(&self.manifest.catalogue).resolve_blueprint(self.blueprint)?;

        let engine = WiringEngine::new(&self.manifest.environment);
        engine.check_unit(&names.lambda.logical_id)?;

        let resources = ResourceFactory::new(self.blueprint).build(&names, provisioner)?;

        let plan = engine.plan(&resources)?;
        let wiring = engine.apply(&plan, provisioner)?;

        let routes = ApiRouter::build(&resources.api, &resources.lambda, &self.blueprint.routes)?;

        tracing::info!(
            "Assembled {}: {} variables, {} grants",
            self.blueprint.stack_id,
            wiring.variables_set,
            wiring.grants_added
        );

        Ok(Assembly {
            resources,
            wiring,
            routes,
        })
    }
}

/// Load a manifest (directory or built-in) and assemble one variant
pub fn assemble_variant(variant: Variant, conf_dir: Option<&Path>) -> Result<AssembledStack> {
    let manifest = load_manifest(variant, conf_dir)?;
    StackAssembler::new(variant, &manifest).assemble()
}

/// `<conf_dir>/<variant>/` when present, else `<conf_dir>` itself, else
/// the built-in manifest.
fn load_manifest(
    variant: Variant,
    conf_dir: Option<&Path>,
) -> std::result::Result<Manifest, CatalogueLoadError> {
    let Some(dir) = conf_dir else {
        return Manifest::builtin(variant);
    };
    let variant_dir = dir.join(variant.as_str());
    if variant_dir.is_dir() {
        Manifest::load_dir(&variant_dir)
    } else {
        Manifest::load_dir(dir)
    }
}
