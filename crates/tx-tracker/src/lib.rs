//! # Transaction Tracker
//!
//! Per-request settlement observation. A tracked request produces zero or
//! more `Pending` observations followed by exactly one terminal
//! `Confirmed`/`Failed`; the terminal status is sticky and never followed by
//! another event.
//!
//! Dropping a tracked request (or the whole tracker) stops local observation
//! only — the underlying request still settles on the ledger, and the next
//! entitlement read reconciles whatever happened while nobody was watching.
//!
//! ## Module Structure
//!
//! ```text
//! tx-tracker/
//! ├── request.rs   # PendingRequest entity, RequestStatus, TrackError
//! └── tracker.rs   # RequestTracker, TrackedRequest, TrackOutcome
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod request;
pub mod tracker;

pub use request::{PendingRequest, RequestStatus, TrackError};
pub use tracker::{RequestTracker, TrackOutcome, TrackedRequest};
