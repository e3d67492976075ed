//! # In-Memory Ledger Adapter
//!
//! Implements `LedgerClientApi` against a simulated chain. Contract semantics
//! mirror the deployed credits, payment-token, and record contracts: a
//! purchase draws its cost through the granted allowance, the free claim is
//! one-shot, a mint assigns the next record identifier.
//!
//! Settlement is decoupled from submission: a submitted request sits pending
//! until `settle_next`/`settle_all` applies it (or `set_auto_confirm(true)`
//! makes settlement immediate), so tests can interleave confirmations however
//! they need.

use crate::config::LedgerClientConfig;
use crate::events::{EventFilter, LedgerEvent, NotificationBus, Subscription};
use crate::ports::{LedgerClientApi, WalletSession};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{
    Account, ContentRef, LedgerError, RecordId, RequestId, RequestKind, TokenAmount, U256,
};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Price of one upload credit in payment-token units (5 USDC, 6 decimals).
pub const DEFAULT_CREDIT_PRICE: u64 = 5_000_000;

/// Credits granted by the one-time free claim.
pub const FREE_CLAIM_CREDITS: u64 = 2;

/// A submitted, not-yet-settled request.
struct Submission {
    id: RequestId,
    kind: RequestKind,
    account: Account,
    action: SubmittedAction,
}

enum SubmittedAction {
    Authorize {
        spender: Account,
        amount: TokenAmount,
    },
    Purchase {
        quantity: u64,
    },
    Claim,
    Mint {
        recipient: Account,
        public_uri: String,
        private_ref: ContentRef,
    },
}

/// Simulated chain state owned by the adapter.
struct ChainState {
    price: TokenAmount,
    token_balances: HashMap<Account, TokenAmount>,
    credit_balances: HashMap<Account, u64>,
    allowances: HashMap<(Account, Account), TokenAmount>,
    claimed: HashSet<Account>,
    records: HashMap<Account, Vec<RecordId>>,
    next_record: RecordId,
    pending: VecDeque<Submission>,
    history: Vec<(RequestId, RequestKind)>,
}

/// In-memory ledger client.
pub struct InMemoryLedger {
    config: LedgerClientConfig,
    wallet: Arc<dyn WalletSession>,
    state: RwLock<ChainState>,
    bus: NotificationBus,
    unreachable: AtomicBool,
    auto_confirm: AtomicBool,
    nonce: AtomicU64,
}

impl InMemoryLedger {
    /// Create an adapter over an empty chain.
    pub fn new(config: LedgerClientConfig, wallet: Arc<dyn WalletSession>) -> Self {
        let bus = NotificationBus::with_capacity(config.event_capacity);
        Self {
            config,
            wallet,
            state: RwLock::new(ChainState {
                price: U256::from(DEFAULT_CREDIT_PRICE),
                token_balances: HashMap::new(),
                credit_balances: HashMap::new(),
                allowances: HashMap::new(),
                claimed: HashSet::new(),
                records: HashMap::new(),
                next_record: 1,
                pending: VecDeque::new(),
                history: Vec::new(),
            }),
            bus,
            unreachable: AtomicBool::new(false),
            auto_confirm: AtomicBool::new(false),
            nonce: AtomicU64::new(0),
        }
    }

    /// Create an adapter with pre-funded payment-token balances.
    pub fn with_balances(
        config: LedgerClientConfig,
        wallet: Arc<dyn WalletSession>,
        balances: &[(Account, TokenAmount)],
    ) -> Self {
        let ledger = Self::new(config, wallet);
        {
            let mut state = ledger.state.write();
            for (account, amount) in balances {
                state.token_balances.insert(*account, *amount);
            }
        }
        ledger
    }

    /// Set an account's payment-token balance.
    pub fn set_token_balance(&self, account: Account, amount: TokenAmount) {
        self.state.write().token_balances.insert(account, amount);
    }

    /// Set an allowance directly, bypassing the authorize path.
    pub fn set_allowance(&self, owner: Account, spender: Account, amount: TokenAmount) {
        self.state.write().allowances.insert((owner, spender), amount);
    }

    /// Set the credit price.
    pub fn set_price(&self, price: TokenAmount) {
        self.state.write().price = price;
    }

    /// Mark an account's free claim as already used.
    ///
    /// Models the claim having happened in another session or tab.
    pub fn mark_claimed(&self, account: Account) {
        self.state.write().claimed.insert(account);
    }

    /// Simulate the ledger endpoint dropping off the network.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Settle every submission at the moment it is submitted.
    pub fn set_auto_confirm(&self, enabled: bool) {
        self.auto_confirm.store(enabled, Ordering::SeqCst);
    }

    /// Kinds of every submission accepted so far, in order.
    pub fn submissions(&self) -> Vec<RequestKind> {
        self.state.read().history.iter().map(|(_, k)| *k).collect()
    }

    /// Number of submissions still awaiting settlement.
    pub fn pending_count(&self) -> usize {
        self.state.read().pending.len()
    }

    /// Settle the oldest pending submission under contract semantics.
    pub fn settle_next(&self) -> Option<RequestId> {
        let submission = self.state.write().pending.pop_front()?;
        let id = submission.id;
        self.settle(submission, None);
        Some(id)
    }

    /// Forcibly revert the oldest pending submission.
    pub fn revert_next(&self, reason: &str) -> Option<RequestId> {
        let submission = self.state.write().pending.pop_front()?;
        let id = submission.id;
        self.settle(submission, Some(reason.to_string()));
        Some(id)
    }

    /// Settle every pending submission in order.
    pub fn settle_all(&self) {
        while self.settle_next().is_some() {}
    }

    /// Handle to the notification bus.
    #[must_use]
    pub fn bus(&self) -> &NotificationBus {
        &self.bus
    }

    fn ensure_reachable(&self) -> Result<(), LedgerError> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(LedgerError::Unavailable(format!(
                "{} unreachable",
                self.config.rpc_endpoint
            )));
        }
        Ok(())
    }

    async fn accept(
        &self,
        kind: RequestKind,
        action_for: impl FnOnce(Account) -> SubmittedAction,
    ) -> Result<RequestId, LedgerError> {
        self.ensure_reachable()?;

        let account = self
            .wallet
            .account()
            .ok_or_else(|| LedgerError::Unavailable("no signer session".to_string()))?;

        if !self.wallet.approve(kind).await {
            info!(%kind, %account, "signature request declined");
            return Err(LedgerError::Rejected);
        }

        let nonce = self.nonce.fetch_add(1, Ordering::SeqCst);
        let id = RequestId::derive(account, nonce);
        let submission = Submission {
            id,
            kind,
            account,
            action: action_for(account),
        };

        info!(request = %id, %kind, %account, "request submitted");
        if self.auto_confirm.load(Ordering::SeqCst) {
            self.state.write().history.push((id, kind));
            self.settle(submission, None);
        } else {
            let mut state = self.state.write();
            state.history.push((id, kind));
            state.pending.push_back(submission);
        }
        Ok(id)
    }

    /// Apply a settlement and emit the resulting notifications.
    fn settle(&self, submission: Submission, forced_revert: Option<String>) {
        let Submission {
            id,
            kind,
            account,
            action,
        } = submission;

        let mut events = Vec::new();
        {
            let spender = self.config.credits_contract;
            let mut state = self.state.write();
            let outcome = match forced_revert {
                Some(reason) => Err(reason),
                None => Self::apply(&mut state, account, spender, &action, &mut events),
            };
            match outcome {
                Ok(()) => {
                    debug!(request = %id, %kind, "request confirmed");
                    events.insert(
                        0,
                        LedgerEvent::RequestConfirmed {
                            request: id,
                            kind,
                            account,
                        },
                    );
                }
                Err(reason) => {
                    warn!(request = %id, %kind, %reason, "request reverted");
                    events = vec![LedgerEvent::RequestReverted {
                        request: id,
                        kind,
                        account,
                        reason,
                    }];
                }
            }
        }

        for event in events {
            self.bus.publish(event);
        }
    }

    /// Contract semantics for a successful settlement.
    ///
    /// Pushes follow-up notifications into `events`; returns the revert
    /// reason on failure.
    fn apply(
        state: &mut ChainState,
        account: Account,
        credits_spender: Account,
        action: &SubmittedAction,
        events: &mut Vec<LedgerEvent>,
    ) -> Result<(), String> {
        match action {
            SubmittedAction::Authorize { spender, amount } => {
                state.allowances.insert((account, *spender), *amount);
                Ok(())
            }
            SubmittedAction::Purchase { quantity } => {
                let cost = state.price * U256::from(*quantity);
                let allowance_key = (account, credits_spender);
                let granted = state
                    .allowances
                    .get(&allowance_key)
                    .copied()
                    .unwrap_or_default();
                if granted < cost {
                    return Err("allowance exceeded".to_string());
                }

                let balance = state
                    .token_balances
                    .get(&account)
                    .copied()
                    .unwrap_or_default();
                if balance < cost {
                    return Err("transfer amount exceeds balance".to_string());
                }

                state.allowances.insert(allowance_key, granted - cost);
                state.token_balances.insert(account, balance - cost);

                let credits = state.credit_balances.entry(account).or_insert(0);
                *credits += quantity;
                events.push(LedgerEvent::CreditsPurchased {
                    account,
                    quantity: *quantity,
                    new_total: *credits,
                });
                Ok(())
            }
            SubmittedAction::Claim => {
                if !state.claimed.insert(account) {
                    return Err("free credits already claimed".to_string());
                }
                let credits = state.credit_balances.entry(account).or_insert(0);
                *credits += FREE_CLAIM_CREDITS;
                events.push(LedgerEvent::FreeCreditsClaimed {
                    account,
                    quantity: FREE_CLAIM_CREDITS,
                });
                Ok(())
            }
            SubmittedAction::Mint {
                recipient,
                public_uri: _,
                private_ref,
            } => {
                let record = state.next_record;
                state.next_record += 1;
                state.records.entry(*recipient).or_default().push(record);
                events.push(LedgerEvent::RecordMinted {
                    recipient: *recipient,
                    record,
                    private_ref: private_ref.clone(),
                });
                Ok(())
            }
        }
    }
}

#[async_trait]
impl LedgerClientApi for InMemoryLedger {
    async fn credit_balance(&self, account: Account) -> Result<u64, LedgerError> {
        self.ensure_reachable()?;
        Ok(self
            .state
            .read()
            .credit_balances
            .get(&account)
            .copied()
            .unwrap_or(0))
    }

    async fn token_balance(&self, account: Account) -> Result<TokenAmount, LedgerError> {
        self.ensure_reachable()?;
        Ok(self
            .state
            .read()
            .token_balances
            .get(&account)
            .copied()
            .unwrap_or_default())
    }

    async fn allowance(
        &self,
        owner: Account,
        spender: Account,
    ) -> Result<TokenAmount, LedgerError> {
        self.ensure_reachable()?;
        Ok(self
            .state
            .read()
            .allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_default())
    }

    async fn claim_eligibility(&self, account: Account) -> Result<bool, LedgerError> {
        self.ensure_reachable()?;
        Ok(!self.state.read().claimed.contains(&account))
    }

    async fn price_per_credit(&self) -> Result<TokenAmount, LedgerError> {
        self.ensure_reachable()?;
        Ok(self.state.read().price)
    }

    async fn records_of(&self, account: Account) -> Result<Vec<RecordId>, LedgerError> {
        self.ensure_reachable()?;
        Ok(self
            .state
            .read()
            .records
            .get(&account)
            .cloned()
            .unwrap_or_default())
    }

    async fn submit_authorize(
        &self,
        spender: Account,
        amount: TokenAmount,
    ) -> Result<RequestId, LedgerError> {
        self.accept(RequestKind::Authorize, |_| SubmittedAction::Authorize {
            spender,
            amount,
        })
        .await
    }

    async fn submit_purchase(&self, quantity: u64) -> Result<RequestId, LedgerError> {
        self.accept(RequestKind::Purchase, |_| SubmittedAction::Purchase {
            quantity,
        })
        .await
    }

    async fn submit_claim(&self) -> Result<RequestId, LedgerError> {
        self.accept(RequestKind::Claim, |_| SubmittedAction::Claim).await
    }

    async fn submit_mint(
        &self,
        recipient: Account,
        public_uri: String,
        private_ref: ContentRef,
    ) -> Result<RequestId, LedgerError> {
        self.accept(RequestKind::Mint, |_| SubmittedAction::Mint {
            recipient,
            public_uri,
            private_ref,
        })
        .await
    }

    fn subscribe(&self, filter: EventFilter) -> Subscription {
        self.bus.subscribe(filter)
    }
}
