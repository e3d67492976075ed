//! # Credits Client Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Shared wiring harness
//! └── integration/      # Cross-crate choreography
//!     ├── purchase_flow.rs
//!     ├── claim_flow.rs
//!     ├── mint_flow.rs
//!     ├── entitlements.rs
//!     └── interleavings.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p client-tests
//!
//! # By area
//! cargo test -p client-tests integration::purchase_flow::
//! cargo test -p client-tests integration::interleavings::
//! ```

#![allow(dead_code)]

pub mod fixtures;
pub mod integration;
