//! # Integration Tests
//!
//! Cross-crate choreography: flows driving the adapter, tracker, and
//! entitlement view together.

pub mod claim_flow;
pub mod entitlements;
pub mod interleavings;
pub mod mint_flow;
pub mod purchase_flow;
