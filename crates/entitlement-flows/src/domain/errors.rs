//! # Flow Errors
//!
//! Terminal failure reasons for the flow machines. Ledger-level failures
//! pass through verbatim; the remaining variants are controller-local.

use shared_types::{LedgerError, RequestKind};
use thiserror::Error;

/// Errors surfaced as a flow's terminal `Failed` state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    /// No wallet session is connected.
    #[error("no wallet session")]
    NoSession,

    /// A ledger read, submission, or settlement failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// A request of this kind is already in flight on this controller.
    #[error("a {0} request is already in flight")]
    RequestActive(RequestKind),

    /// The requested phase change is not allowed.
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition {
        /// Current phase.
        from: String,
        /// Attempted phase.
        to: String,
    },

    /// Purchase quantity must be at least one credit.
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// The free claim is no longer available to this account.
    #[error("free claim no longer available")]
    NotEligible,

    /// The routine descriptor could not be prepared for minting.
    #[error("routine descriptor invalid: {0}")]
    Descriptor(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_errors_pass_through_verbatim() {
        let err: FlowError = LedgerError::Rejected.into();
        assert_eq!(err.to_string(), LedgerError::Rejected.to_string());
    }

    #[test]
    fn test_request_active_names_the_kind() {
        let err = FlowError::RequestActive(RequestKind::Purchase);
        assert!(err.to_string().contains("purchase credits"));
    }
}
