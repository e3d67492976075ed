//! # Entitlement State
//!
//! Read-mostly view combining the account's credit balance, payment-token
//! balance, allowance, and claim eligibility. The cache is advisory, never
//! authoritative: any confirmed mutation invalidates it, and gated decisions
//! always go through a forced re-read.

use crate::domain::FlowError;
use ledger_client::{LedgerClientApi, LedgerEvent, Subscription, WalletSession};
use parking_lot::RwLock;
use shared_types::{Account, TokenAmount, U256};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Point-in-time view of one account's entitlements.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntitlementSnapshot {
    /// The account the snapshot belongs to.
    pub account: Account,
    /// Upload credits remaining.
    pub credit_balance: u64,
    /// Payment-token balance.
    pub token_balance: TokenAmount,
    /// Allowance granted to the credits contract.
    pub allowance: TokenAmount,
    /// Whether the one-time free claim is still available.
    pub claim_eligible: bool,
    /// Current price of one credit.
    pub price_per_credit: TokenAmount,
}

impl EntitlementSnapshot {
    /// Cost of purchasing `quantity` credits.
    #[must_use]
    pub fn total_cost(&self, quantity: u64) -> TokenAmount {
        self.price_per_credit * U256::from(quantity)
    }

    /// Whether an approval must precede a purchase of `quantity` credits.
    ///
    /// The allowance comparison is the sole gate; no implicit
    /// infinite-allowance assumption.
    #[must_use]
    pub fn needs_authorization(&self, quantity: u64) -> bool {
        self.allowance < self.total_cost(quantity)
    }

    /// Whether the token balance covers a purchase of `quantity` credits.
    #[must_use]
    pub fn can_fund(&self, quantity: u64) -> bool {
        self.token_balance >= self.total_cost(quantity)
    }

    /// Whether the free claim can be offered right now.
    ///
    /// Pure function of current state; recomputed per snapshot so the answer
    /// is never cached across a claim's own pending window.
    #[must_use]
    pub fn can_claim_free(&self, already_claiming: bool) -> bool {
        self.claim_eligible && !already_claiming
    }
}

/// Cached entitlement view for the connected account.
pub struct EntitlementView {
    ledger: Arc<dyn LedgerClientApi>,
    session: Arc<dyn WalletSession>,
    spender: Account,
    cache: RwLock<Option<EntitlementSnapshot>>,
}

impl EntitlementView {
    /// Create a view reading through `ledger` for the session's account.
    ///
    /// `spender` is the credits-contract address whose allowance gates
    /// purchases.
    pub fn new(
        ledger: Arc<dyn LedgerClientApi>,
        session: Arc<dyn WalletSession>,
        spender: Account,
    ) -> Self {
        Self {
            ledger,
            session,
            spender,
            cache: RwLock::new(None),
        }
    }

    /// The allowance spender this view gates against.
    #[must_use]
    pub fn spender(&self) -> Account {
        self.spender
    }

    /// Current snapshot, served from cache when still valid.
    ///
    /// Two calls with no intervening confirmed mutation yield identical
    /// values.
    pub async fn snapshot(&self) -> Result<EntitlementSnapshot, FlowError> {
        let account = self.session.account().ok_or(FlowError::NoSession)?;
        if let Some(snapshot) = self.cache.read().clone() {
            if snapshot.account == account {
                return Ok(snapshot);
            }
        }
        self.refresh().await
    }

    /// Re-read every component from the ledger, replacing the cache.
    pub async fn refresh(&self) -> Result<EntitlementSnapshot, FlowError> {
        let account = self.session.account().ok_or(FlowError::NoSession)?;

        let snapshot = EntitlementSnapshot {
            account,
            credit_balance: self.ledger.credit_balance(account).await?,
            token_balance: self.ledger.token_balance(account).await?,
            allowance: self.ledger.allowance(account, self.spender).await?,
            claim_eligible: self.ledger.claim_eligibility(account).await?,
            price_per_credit: self.ledger.price_per_credit().await?,
        };

        debug!(
            account = %snapshot.account,
            credits = snapshot.credit_balance,
            claim_eligible = snapshot.claim_eligible,
            "entitlement view refreshed"
        );
        *self.cache.write() = Some(snapshot.clone());
        Ok(snapshot)
    }

    /// Drop the cached snapshot; the next read goes to the ledger.
    pub fn invalidate(&self) {
        *self.cache.write() = None;
    }

    /// Invalidate on any confirmed mutation touching the session's account.
    ///
    /// Reversions leave state untouched on the ledger, so only confirmations
    /// invalidate.
    pub fn handle_event(&self, event: &LedgerEvent) {
        let Some(account) = self.session.account() else {
            return;
        };
        let invalidates = match event {
            LedgerEvent::RequestConfirmed {
                account: event_account,
                ..
            } => *event_account == account,
            LedgerEvent::CreditsPurchased {
                account: event_account,
                ..
            }
            | LedgerEvent::FreeCreditsClaimed {
                account: event_account,
                ..
            } => *event_account == account,
            LedgerEvent::RecordMinted { recipient, .. } => *recipient == account,
            LedgerEvent::RequestReverted { .. } => false,
        };
        if invalidates {
            debug!("confirmed mutation observed, invalidating entitlement cache");
            self.invalidate();
        }
    }

    /// Spawn a task invalidating the cache as notifications arrive.
    pub fn spawn_invalidator(self: &Arc<Self>, mut subscription: Subscription) -> JoinHandle<()> {
        let view = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(event) = subscription.recv().await {
                view.handle_event(&event);
            }
        })
    }
}
