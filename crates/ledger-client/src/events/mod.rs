//! # Ledger Notifications
//!
//! Event types emitted by the ledger and the filter used when subscribing.
//! Notifications only ever trigger re-reads; they are never the source of
//! truth for a balance or an eligibility flag.

mod bus;

pub use bus::{NotificationBus, NotificationStream, Subscription, SubscriptionError};

use serde::{Deserialize, Serialize};
use shared_types::{Account, ContentRef, RecordId, RequestId, RequestKind};

/// All notifications the ledger can emit toward this client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// A submitted request settled successfully.
    RequestConfirmed {
        /// The settled request.
        request: RequestId,
        /// What the request was doing.
        kind: RequestKind,
        /// The account that submitted it.
        account: Account,
    },

    /// A submitted request settled as failed on-chain.
    RequestReverted {
        /// The settled request.
        request: RequestId,
        /// What the request was doing.
        kind: RequestKind,
        /// The account that submitted it.
        account: Account,
        /// Revert reason reported by the ledger.
        reason: String,
    },

    /// A credit purchase completed.
    CreditsPurchased {
        /// Buyer.
        account: Account,
        /// Credits bought.
        quantity: u64,
        /// Buyer's credit balance after the purchase.
        new_total: u64,
    },

    /// The one-time free grant was claimed.
    FreeCreditsClaimed {
        /// Claimer.
        account: Account,
        /// Credits granted.
        quantity: u64,
    },

    /// A routine record was minted.
    RecordMinted {
        /// Owner of the new record.
        recipient: Account,
        /// Ledger-assigned record identifier.
        record: RecordId,
        /// Reference to the privately stored payload.
        private_ref: ContentRef,
    },
}

impl LedgerEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::RequestConfirmed { .. } | Self::RequestReverted { .. } => EventTopic::Settlement,
            Self::CreditsPurchased { .. } | Self::FreeCreditsClaimed { .. } => EventTopic::Credits,
            Self::RecordMinted { .. } => EventTopic::Records,
        }
    }

    /// The account this event concerns.
    #[must_use]
    pub fn account(&self) -> Account {
        match self {
            Self::RequestConfirmed { account, .. }
            | Self::RequestReverted { account, .. }
            | Self::CreditsPurchased { account, .. }
            | Self::FreeCreditsClaimed { account, .. } => *account,
            Self::RecordMinted { recipient, .. } => *recipient,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Request confirmations and reversions.
    Settlement,
    /// Credit purchases and free claims.
    Credits,
    /// Record mints.
    Records,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific notifications.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Restrict to a single account. `None` means all accounts.
    pub account: Option<Account>,
}

impl EventFilter {
    /// Create a filter that accepts all notifications.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            account: None,
        }
    }

    /// Create a filter for the settlement channel only.
    #[must_use]
    pub fn settlement() -> Self {
        Self::topics(vec![EventTopic::Settlement])
    }

    /// Restrict this filter to a single account.
    #[must_use]
    pub fn for_account(mut self, account: Account) -> Self {
        self.account = Some(account);
        self
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &LedgerEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let account_match = self
            .account
            .map_or(true, |account| event.account() == account);

        topic_match && account_match
    }
}
