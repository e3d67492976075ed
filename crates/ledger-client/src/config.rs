//! # Ledger Client Configuration
//!
//! Explicit construction-time configuration for the adapter. Nothing in the
//! client reads ambient globals; every collaborator address is enumerated
//! here.

use serde::{Deserialize, Serialize};
use shared_types::Account;

/// Construction-time configuration for a ledger client.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerClientConfig {
    /// Read endpoint of the ledger node.
    pub rpc_endpoint: String,

    /// Address of the payment-token contract (USDC-style, 6 decimals).
    pub payment_token: Account,

    /// Address of the credits contract (the allowance spender).
    pub credits_contract: Account,

    /// Address of the routine-record contract.
    pub record_contract: Account,

    /// Maximum notifications buffered per subscriber before backpressure.
    pub event_capacity: usize,
}

impl LedgerClientConfig {
    /// Create a config for testing (local endpoint, fixed addresses).
    pub fn for_testing() -> Self {
        Self {
            rpc_endpoint: "http://localhost:8545".to_string(),
            // Base testnet USDC
            payment_token: Account::new([
                0x03, 0x6C, 0xbD, 0x53, 0x84, 0x2c, 0x54, 0x26, 0x63, 0x4e, 0x79, 0x29, 0x54,
                0x1e, 0xC2, 0x31, 0x8f, 0x3d, 0xCF, 0x7e,
            ]),
            credits_contract: Account::new([0x11; 20]),
            record_contract: Account::new([0x22; 20]),
            event_capacity: 256,
        }
    }
}
