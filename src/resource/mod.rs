//! Resource naming layer
//!
//! This module turns declarative manifests into the names the provider
//! will see. Nothing here creates resources.
//!
//! # Architecture
//!
//! - [`catalogue`] - (type, logical id) -> concrete name table
//! - [`environment`] - per compute unit, named environment variable slots
//! - [`resolver`] - resolves every name a variant needs before creation
//! - [`manifest`] - document formats, directory loading, built-in manifests
//!
//! # Manifests
//!
//! A manifest directory holds two documents, each `.json`, `.yaml` or `.yml`:
//! - `resource-names` - the catalogue
//! - `lambda-environment-variables` - the environment schema
//!
//! # Example
//!
//! ```ignore
//! use crate::resource::{Manifest, NameResolver};
//! use crate::variant::Variant;
//!
//! let manifest = Manifest::builtin(Variant::Images)?;
//! let names = NameResolver::new(&manifest.catalogue)
//!     .resolve_blueprint(Variant::Images.blueprint())?;
//! ```

pub mod catalogue;
pub mod environment;
pub mod manifest;
pub mod resolver;

pub use catalogue::{Catalogue, ResourceDescriptor, ResourceType};
pub use environment::{EnvSlot, EnvironmentSchema, UnitEnvironment};
pub use manifest::{Manifest, ManifestFormat};
pub use resolver::{NameResolver, ResolvedNames};
