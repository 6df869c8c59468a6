//! Stack assembly
//!
//! - [`factory`] - creates resources in dependency order
//! - [`wiring`] - environment injection and grants
//! - [`router`] - front door route tree
//! - [`assembler`] - runs the above for one variant

pub mod assembler;
pub mod factory;
pub mod router;
pub mod wiring;

pub use assembler::{assemble_variant, AssembledStack, Assembly, StackAssembler};
pub use factory::{ProvisionedStack, ResourceFactory};
pub use router::{ApiRouter, HttpMethod, Route, RouteTree};
pub use wiring::{GrantDirective, WiringDirective, WiringEngine, WiringPlan, WiringReport};
