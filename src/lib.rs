//! Declarative infrastructure for the media backends
//!
//! Each backend variant (images, memes, image drive) is a stack of one
//! bucket, an optional layer, one compute unit, one table and one REST
//! front door. This crate resolves their names from a manifest, declares
//! them in dependency order, wires the compute unit to its bucket and
//! table, and hands the result to a deployment tool.
//!
//! - [`resource`] - catalogue, environment schema, name resolution
//! - [`provider`] - provisioner seam and the declaration graph
//! - [`stack`] - factory, wiring, router, assembler
//! - [`deploy`] - declaration output
//! - [`config`] - persisted user settings

pub mod config;
pub mod deploy;
pub mod error;
pub mod provider;
pub mod resource;
pub mod stack;
pub mod variant;

pub use error::{
    CatalogueLoadError, NameResolutionError, ResourceCreationError, StackError, WiringError,
};
pub use stack::{assemble_variant, AssembledStack, StackAssembler};
pub use variant::Variant;
