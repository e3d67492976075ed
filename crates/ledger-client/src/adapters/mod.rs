//! # Adapters
//!
//! Concrete implementations of the ledger client port.

pub mod in_memory;

pub use in_memory::{InMemoryLedger, DEFAULT_CREDIT_PRICE, FREE_CLAIM_CREDITS};
