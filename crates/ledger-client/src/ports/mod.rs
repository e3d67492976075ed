//! # Ports
//!
//! Inbound API trait plus the outbound wallet-session dependency.

pub mod inbound;
pub mod outbound;

pub use inbound::LedgerClientApi;
pub use outbound::{StaticWallet, WalletSession};
