//! # Ledger Client
//!
//! Typed read/write adapter for the credits ledger, reachable only through a
//! wallet-mediated signing interface.
//!
//! ## Purpose
//!
//! Give the flow machines a narrow, non-blocking surface over the three
//! on-chain collaborators:
//! - the payment token (balances, allowances),
//! - the credits contract (credit balances, free claim, purchases),
//! - the record contract (routine record minting).
//!
//! Every submission returns a `RequestId` immediately; settlement is observed
//! through the notification bus, never through the submitting call.
//!
//! ## Module Structure
//!
//! ```text
//! ledger-client/
//! ├── config.rs        # Explicit endpoint + contract addresses
//! ├── events/          # LedgerEvent, EventFilter, NotificationBus
//! ├── ports/           # LedgerClientApi (inbound) + WalletSession (outbound)
//! └── adapters/        # InMemoryLedger simulated chain
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod events;
pub mod ports;

// Re-exports
pub use adapters::{InMemoryLedger, DEFAULT_CREDIT_PRICE, FREE_CLAIM_CREDITS};
pub use config::LedgerClientConfig;
pub use events::{
    EventFilter, EventTopic, LedgerEvent, NotificationBus, NotificationStream, Subscription,
    SubscriptionError,
};
pub use ports::{LedgerClientApi, StaticWallet, WalletSession};
