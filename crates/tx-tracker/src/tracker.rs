//! # Request Tracker
//!
//! Drains the ledger's settlement channel on a background task and exposes
//! each request's status as an observable. Ordering guarantee per request:
//! `Pending`* then exactly one terminal event.

use crate::request::{PendingRequest, RequestStatus};
use ledger_client::{LedgerEvent, Subscription};
use parking_lot::Mutex;
use shared_types::{RequestId, RequestKind};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Settlements remembered for `track` calls that arrive after the event.
const SETTLED_CACHE_SIZE: usize = 256;

/// Outcome of waiting on a tracked request with a stall advisory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackOutcome {
    /// The request settled successfully.
    Confirmed,
    /// The request settled as failed, with the revert reason.
    Failed(String),
    /// Advisory only: the wait interval elapsed while the request is still
    /// in flight. Nothing was cancelled; waiting again is valid.
    Stalled,
}

struct TrackerInner {
    active: Mutex<HashMap<RequestId, watch::Sender<RequestStatus>>>,
    settled: Mutex<VecDeque<(RequestId, RequestStatus)>>,
}

impl TrackerInner {
    /// Deliver a terminal status and retire the request from active tracking.
    fn resolve(&self, id: RequestId, status: RequestStatus) {
        if let Some(sender) = self.active.lock().remove(&id) {
            let _ = sender.send(status.clone());
        }
        let mut settled = self.settled.lock();
        settled.push_back((id, status));
        if settled.len() > SETTLED_CACHE_SIZE {
            settled.pop_front();
        }
    }
}

/// Tracks submitted requests through to settlement.
pub struct RequestTracker {
    inner: Arc<TrackerInner>,
    task: JoinHandle<()>,
}

impl RequestTracker {
    /// Spawn a tracker draining the given settlement subscription.
    ///
    /// The subscription should be filtered to the settlement topic; other
    /// notifications are ignored.
    #[must_use]
    pub fn spawn(subscription: Subscription) -> Self {
        let inner = Arc::new(TrackerInner {
            active: Mutex::new(HashMap::new()),
            settled: Mutex::new(VecDeque::new()),
        });
        let task = tokio::spawn(drain(inner.clone(), subscription));
        Self { inner, task }
    }

    /// Start observing a submitted request.
    ///
    /// If the settlement already happened (fast confirmation racing this
    /// call), the returned handle resolves immediately.
    #[must_use]
    pub fn track(&self, id: RequestId, kind: RequestKind) -> TrackedRequest {
        let mut active = self.inner.active.lock();

        let already_settled = self
            .inner
            .settled
            .lock()
            .iter()
            .rev()
            .find(|(settled_id, _)| *settled_id == id)
            .map(|(_, status)| status.clone());

        let rx = if let Some(status) = already_settled {
            trace!(request = %id, "tracking an already settled request");
            let (tx, rx) = watch::channel(status);
            drop(tx);
            rx
        } else {
            let sender = active
                .entry(id)
                .or_insert_with(|| watch::channel(RequestStatus::Pending).0);
            sender.subscribe()
        };

        debug!(request = %id, %kind, "tracking request");
        TrackedRequest {
            request: PendingRequest::new(id, kind),
            rx,
        }
    }

    /// Number of requests still awaiting a terminal event.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.inner.active.lock().len()
    }
}

impl Drop for RequestTracker {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn drain(inner: Arc<TrackerInner>, mut subscription: Subscription) {
    while let Some(event) = subscription.recv().await {
        let (id, status) = match event {
            LedgerEvent::RequestConfirmed { request, .. } => (request, RequestStatus::Confirmed),
            LedgerEvent::RequestReverted {
                request, reason, ..
            } => (request, RequestStatus::Failed(reason)),
            _ => continue,
        };
        inner.resolve(id, status);
    }
}

/// Observable handle for one submitted request.
pub struct TrackedRequest {
    request: PendingRequest,
    rx: watch::Receiver<RequestStatus>,
}

impl TrackedRequest {
    /// The tracked request's identifier.
    #[must_use]
    pub fn id(&self) -> RequestId {
        self.request.id
    }

    /// The tracked request's kind.
    #[must_use]
    pub fn kind(&self) -> RequestKind {
        self.request.kind
    }

    /// The underlying pending-request entity.
    #[must_use]
    pub fn request(&self) -> &PendingRequest {
        &self.request
    }

    /// Current status without waiting.
    #[must_use]
    pub fn status(&self) -> RequestStatus {
        self.rx.borrow().clone()
    }

    /// Wait for the terminal status.
    pub async fn wait(&mut self) -> RequestStatus {
        loop {
            let current = self.rx.borrow_and_update().clone();
            if current.is_terminal() {
                if !self.request.status().is_terminal() {
                    let _ = self.request.settle(current.clone());
                }
                return current;
            }
            if self.rx.changed().await.is_err() {
                // Tracker torn down while pending; report the last observed
                // status and let the next entitlement read reconcile.
                return self.rx.borrow().clone();
            }
        }
    }

    /// Wait for the terminal status, surfacing a `Stalled` advisory if it
    /// has not arrived within `advisory_after`.
    ///
    /// `Stalled` never cancels anything; callers may simply wait again.
    pub async fn wait_with_stall(&mut self, advisory_after: Duration) -> TrackOutcome {
        match tokio::time::timeout(advisory_after, self.wait()).await {
            Ok(RequestStatus::Confirmed) => TrackOutcome::Confirmed,
            Ok(RequestStatus::Failed(reason)) => TrackOutcome::Failed(reason),
            Ok(RequestStatus::Pending) | Err(_) => TrackOutcome::Stalled,
        }
    }
}
