//! # Inbound Port
//!
//! The typed surface the flow machines program against. All operations are
//! non-blocking: reads return the current ledger value, submissions return a
//! `RequestId` immediately. Whether a submission eventually confirms or
//! reverts is observed through the settlement channel, never through the
//! submitting call.

use crate::events::{EventFilter, Subscription};
use async_trait::async_trait;
use shared_types::{Account, ContentRef, LedgerError, RecordId, RequestId, TokenAmount};

/// Ledger client API - inbound port.
#[async_trait]
pub trait LedgerClientApi: Send + Sync {
    /// Upload-credit balance of an account.
    async fn credit_balance(&self, account: Account) -> Result<u64, LedgerError>;

    /// Payment-token balance of an account.
    async fn token_balance(&self, account: Account) -> Result<TokenAmount, LedgerError>;

    /// Spending cap `owner` has granted to `spender` on the payment token.
    async fn allowance(
        &self,
        owner: Account,
        spender: Account,
    ) -> Result<TokenAmount, LedgerError>;

    /// Whether the one-time free claim is still available to an account.
    async fn claim_eligibility(&self, account: Account) -> Result<bool, LedgerError>;

    /// Current price of one upload credit in payment-token units.
    async fn price_per_credit(&self) -> Result<TokenAmount, LedgerError>;

    /// Identifiers of the routine records owned by an account.
    async fn records_of(&self, account: Account) -> Result<Vec<RecordId>, LedgerError>;

    /// Submit an allowance grant for `spender`.
    ///
    /// Fails `Rejected` when the signer declines and `Unavailable` when no
    /// signer session exists; a pending-but-eventually-reverting outcome is
    /// never an error here.
    async fn submit_authorize(
        &self,
        spender: Account,
        amount: TokenAmount,
    ) -> Result<RequestId, LedgerError>;

    /// Submit a purchase of `quantity` upload credits.
    async fn submit_purchase(&self, quantity: u64) -> Result<RequestId, LedgerError>;

    /// Submit the one-time free credit claim.
    async fn submit_claim(&self) -> Result<RequestId, LedgerError>;

    /// Submit a routine-record mint.
    ///
    /// `public_uri` is the public descriptor; `private_ref` is the derived
    /// reference to the privately stored payload.
    async fn submit_mint(
        &self,
        recipient: Account,
        public_uri: String,
        private_ref: ContentRef,
    ) -> Result<RequestId, LedgerError>;

    /// Subscribe to ledger notifications matching `filter`.
    ///
    /// The sequence is lazy, infinite, and restartable; it only ever triggers
    /// re-reads and is never the source of truth for a value.
    fn subscribe(&self, filter: EventFilter) -> Subscription;
}
