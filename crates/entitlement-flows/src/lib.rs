//! # Entitlement Flows
//!
//! The user-facing half of the credits client: a read-mostly entitlement
//! view over the ledger, and one explicit state machine per user-initiated
//! action (purchase, free claim, record mint).
//!
//! Each flow controller drives its action end to end: consult the
//! entitlement view, submit any prerequisite authorization, await settlement
//! through the tracker, submit the primary action, and reconcile the view
//! once the ledger confirms. Controllers are independent of any rendering
//! framework; presentation observes them through a watch channel.
//!
//! ## Module Structure
//!
//! ```text
//! entitlement-flows/
//! ├── domain/          # Phase machines, flow errors, routine descriptors
//! ├── entitlements.rs  # EntitlementView snapshot cache
//! ├── flows/           # PurchaseFlow, ClaimFlow, MintFlow
//! └── config.rs        # FlowConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod domain;
pub mod entitlements;
pub mod flows;

// Re-exports
pub use config::FlowConfig;
pub use domain::{
    ClaimPhase, FlowError, MintArtifacts, MintPhase, PublicDescriptor, PurchasePhase,
    RoutineDescriptor,
};
pub use entitlements::{EntitlementSnapshot, EntitlementView};
pub use flows::{ClaimFlow, ClaimState, MintFlow, MintState, PurchaseFlow, PurchaseState};
