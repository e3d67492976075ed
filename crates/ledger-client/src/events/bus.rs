//! # Notification Bus
//!
//! Broadcast fan-out for ledger notifications. Subscriptions are lazy,
//! infinite, and restartable: dropping one stops local observation only and
//! never retracts anything already submitted to the ledger.

use super::{EventFilter, LedgerEvent};
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio_stream::Stream;
use tracing::{debug, warn};

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The notification bus was closed.
    #[error("notification bus closed")]
    Closed,
}

/// In-memory fan-out for ledger notifications.
///
/// Uses `tokio::sync::broadcast` for multi-consumer semantics. A production
/// deployment would back this with the node's websocket log subscription; the
/// surface stays the same.
pub struct NotificationBus {
    /// Broadcast sender for events.
    sender: broadcast::Sender<LedgerEvent>,

    /// Total events published.
    events_published: AtomicU64,

    /// Channel capacity.
    capacity: usize,
}

impl NotificationBus {
    /// Create a bus with the given per-subscriber buffer capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            events_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Publish a notification to all current subscribers.
    ///
    /// Returns the number of subscribers that received it.
    pub fn publish(&self, event: LedgerEvent) -> usize {
        let topic = event.topic();
        self.events_published.fetch_add(1, Ordering::Relaxed);

        match self.sender.send(event) {
            Ok(receiver_count) => {
                debug!(topic = ?topic, receivers = receiver_count, "notification published");
                receiver_count
            }
            Err(_) => {
                // No receivers yet; the value is recoverable by re-reading.
                debug!(topic = ?topic, "notification dropped (no receivers)");
                0
            }
        }
    }

    /// Subscribe to notifications matching a filter.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        debug!(topics = ?filter.topics, account = ?filter.account, "new subscription");
        Subscription {
            receiver: self.sender.subscribe(),
            filter,
        }
    }

    /// Get a `Stream` of notifications matching a filter.
    #[must_use]
    pub fn stream(&self, filter: EventFilter) -> NotificationStream {
        NotificationStream::new(self.subscribe(filter))
    }

    /// Number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Total number of notifications published so far.
    #[must_use]
    pub fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }

    /// Per-subscriber buffer capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// A subscription handle for receiving notifications.
pub struct Subscription {
    /// The broadcast receiver.
    receiver: broadcast::Receiver<LedgerEvent>,

    /// Filter for this subscription.
    filter: EventFilter,
}

impl Subscription {
    /// Receive the next notification that matches the filter.
    ///
    /// Returns `None` once the bus is dropped.
    pub async fn recv(&mut self) -> Option<LedgerEvent> {
        loop {
            let event = match self.receiver.recv().await {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    warn!(lagged = count, "subscriber lagged, notifications dropped");
                    continue;
                }
            };

            if self.filter.matches(&event) {
                return Some(event);
            }
        }
    }

    /// Try to receive the next matching notification without blocking.
    pub fn try_recv(&mut self) -> Result<Option<LedgerEvent>, SubscriptionError> {
        loop {
            let event = match self.receiver.try_recv() {
                Ok(event) => event,
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(SubscriptionError::Closed)
                }
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            };

            if self.filter.matches(&event) {
                return Ok(Some(event));
            }
        }
    }

    /// Get the filter for this subscription.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }
}

/// A stream wrapper for subscriptions.
///
/// Implements `tokio_stream::Stream` for use with stream combinators.
pub struct NotificationStream {
    subscription: Subscription,
}

impl NotificationStream {
    /// Create a stream from a subscription.
    #[must_use]
    pub fn new(subscription: Subscription) -> Self {
        Self { subscription }
    }

    /// Get the filter for this stream.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        self.subscription.filter()
    }
}

impl Stream for NotificationStream {
    type Item = LedgerEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.subscription.try_recv() {
            Ok(Some(event)) => Poll::Ready(Some(event)),
            Ok(None) => {
                cx.waker().wake_by_ref();
                Poll::Pending
            }
            Err(SubscriptionError::Closed) => Poll::Ready(None),
        }
    }
}
