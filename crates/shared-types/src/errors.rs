//! # Ledger Error Taxonomy
//!
//! Failure modes shared by the adapter, the tracker, and the flow machines.

use crate::entities::TokenAmount;
use thiserror::Error;

/// Errors surfaced by ledger reads, submissions, and settlements.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// No signer session is available.
    #[error("no wallet session")]
    NoSession,

    /// The signer declined the request.
    #[error("signature request rejected")]
    Rejected,

    /// Payment-token balance cannot cover the cost (local pre-check).
    #[error("insufficient funds: need {required}, have {available}")]
    InsufficientFunds {
        /// Cost of the attempted action.
        required: TokenAmount,
        /// Payment-token balance actually held.
        available: TokenAmount,
    },

    /// Granted allowance cannot cover the cost (defensive re-check).
    #[error("insufficient allowance: need {required}, granted {granted}")]
    InsufficientAllowance {
        /// Cost of the attempted action.
        required: TokenAmount,
        /// Allowance currently granted to the spender.
        granted: TokenAmount,
    },

    /// The ledger is unreachable or no account is connected.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    /// The request was submitted but confirmed as failed on-chain.
    #[error("request reverted: {0}")]
    Reverted(String),
}
