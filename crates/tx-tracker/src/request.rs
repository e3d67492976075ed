//! # Pending Request Entity
//!
//! A submitted request and its settle-exactly-once status transition.

use shared_types::{unix_now, RequestId, RequestKind};
use thiserror::Error;

/// Status of a submitted request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestStatus {
    /// Submitted, not yet settled.
    #[default]
    Pending,
    /// Settled successfully.
    Confirmed,
    /// Settled as failed on-chain, with the revert reason.
    Failed(String),
}

impl RequestStatus {
    /// Check if this is a terminal status.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Tracking errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackError {
    /// The request already reached a terminal status.
    #[error("request {0} already settled")]
    AlreadySettled(RequestId),

    /// A settle call carried a non-terminal status.
    #[error("cannot settle to a pending status")]
    NotTerminal,
}

/// A submitted request awaiting settlement.
///
/// Transitions exactly once from `Pending` to a terminal status, then is
/// retired from active tracking and retained only for display.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    /// Ledger-assigned request identifier.
    pub id: RequestId,
    /// What the request is doing.
    pub kind: RequestKind,
    /// Unix timestamp of the submission.
    pub submitted_at: u64,
    status: RequestStatus,
}

impl PendingRequest {
    /// Create a pending request submitted now.
    #[must_use]
    pub fn new(id: RequestId, kind: RequestKind) -> Self {
        Self {
            id,
            kind,
            submitted_at: unix_now(),
            status: RequestStatus::Pending,
        }
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> &RequestStatus {
        &self.status
    }

    /// Move to a terminal status.
    pub fn settle(&mut self, terminal: RequestStatus) -> Result<(), TrackError> {
        if !terminal.is_terminal() {
            return Err(TrackError::NotTerminal);
        }
        if self.status.is_terminal() {
            return Err(TrackError::AlreadySettled(self.id));
        }
        self.status = terminal;
        Ok(())
    }
}
