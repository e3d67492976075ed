//! # Domain
//!
//! Phase machines, flow errors, and routine descriptors.

pub mod errors;
pub mod phases;
pub mod routine;

pub use errors::FlowError;
pub use phases::{ClaimPhase, MintPhase, PurchasePhase};
pub use routine::{MintArtifacts, PublicDescriptor, RoutineDescriptor};
