//! # Flow Controllers
//!
//! One state machine per user-initiated ledger action. Controllers are
//! independent: they touch disjoint request kinds and share no lock. Each
//! accepts one `start` and one `reset` per cycle and exposes its state
//! through a watch channel.

pub mod claim;
pub mod mint;
pub mod purchase;

pub use claim::{ClaimFlow, ClaimState};
pub use mint::{MintFlow, MintState};
pub use purchase::{PurchaseFlow, PurchaseState};
