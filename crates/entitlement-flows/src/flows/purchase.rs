//! # Purchase Flow
//!
//! Drives a credit purchase end to end: check the allowance, run the
//! prerequisite approval when it falls short, pre-check the payment-token
//! balance locally so no signature is wasted on a doomed transaction, then
//! submit and await the purchase itself.

use crate::config::FlowConfig;
use crate::domain::{FlowError, PurchasePhase};
use crate::entitlements::EntitlementView;
use ledger_client::{LedgerClientApi, WalletSession};
use parking_lot::Mutex;
use shared_types::{LedgerError, RequestId, RequestKind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use tx_tracker::{RequestTracker, TrackOutcome, TrackedRequest};

/// Observable state of a purchase flow.
#[derive(Clone, Debug, Default)]
pub struct PurchaseState {
    /// Current phase.
    pub phase: PurchasePhase,
    /// Advisory: confirmation latency exceeded the configured interval.
    pub stalled: bool,
    /// The in-flight request, if any.
    pub active: Option<RequestId>,
    /// Terminal failure reason, if the flow failed.
    pub error: Option<FlowError>,
    /// Credit balance after a confirmed purchase.
    pub credits: Option<u64>,
}

/// State machine for one credit purchase interaction.
pub struct PurchaseFlow {
    ledger: Arc<dyn LedgerClientApi>,
    tracker: Arc<RequestTracker>,
    entitlements: Arc<EntitlementView>,
    session: Arc<dyn WalletSession>,
    config: FlowConfig,
    state: watch::Sender<PurchaseState>,
    running: AtomicBool,
    history: Mutex<Vec<PurchasePhase>>,
}

impl PurchaseFlow {
    /// Create an idle purchase flow.
    pub fn new(
        ledger: Arc<dyn LedgerClientApi>,
        tracker: Arc<RequestTracker>,
        entitlements: Arc<EntitlementView>,
        session: Arc<dyn WalletSession>,
        config: FlowConfig,
    ) -> Self {
        let (state, _) = watch::channel(PurchaseState::default());
        Self {
            ledger,
            tracker,
            entitlements,
            session,
            config,
            state,
            running: AtomicBool::new(false),
            history: Mutex::new(vec![PurchasePhase::Idle]),
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> PurchaseState {
        self.state.borrow().clone()
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> PurchasePhase {
        self.state.borrow().phase
    }

    /// Human-readable progress label for the current phase.
    #[must_use]
    pub fn progress_label(&self) -> &'static str {
        self.phase().label()
    }

    /// Observe state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PurchaseState> {
        self.state.subscribe()
    }

    /// Every phase entered since creation (or the last reset), in order.
    #[must_use]
    pub fn transitions(&self) -> Vec<PurchasePhase> {
        self.history.lock().clone()
    }

    /// Drive a purchase of `quantity` credits to its terminal phase.
    ///
    /// Returns the refreshed credit balance on confirmation. A failure is
    /// also recorded in the flow state as `Failed` with the reason.
    pub async fn start(&self, quantity: u64) -> Result<u64, FlowError> {
        if quantity == 0 {
            return Err(FlowError::InvalidQuantity);
        }
        self.begin()?;
        let result = self.run(quantity).await;
        self.running.store(false, Ordering::SeqCst);
        match result {
            Ok(credits) => Ok(credits),
            Err(error) => {
                self.fail(error.clone());
                Err(error)
            }
        }
    }

    /// Return a terminal flow to `Idle`, clearing all residual state.
    pub fn reset(&self) -> Result<(), FlowError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(FlowError::RequestActive(RequestKind::Purchase));
        }
        let phase = self.phase();
        if !phase.can_transition_to(PurchasePhase::Idle) {
            return Err(FlowError::InvalidTransition {
                from: format!("{phase:?}"),
                to: format!("{:?}", PurchasePhase::Idle),
            });
        }
        self.state.send_replace(PurchaseState::default());
        self.history.lock().push(PurchasePhase::Idle);
        Ok(())
    }

    /// Session boundary hook: the wallet disconnected.
    ///
    /// An active flow moves straight to `Failed(NoSession)`; idle and
    /// terminal flows are left alone.
    pub fn fail_disconnected(&self) {
        let phase = self.phase();
        if phase != PurchasePhase::Idle && !phase.is_terminal() {
            self.fail(FlowError::NoSession);
        }
    }

    fn begin(&self) -> Result<(), FlowError> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(FlowError::RequestActive(RequestKind::Purchase));
        }
        let phase = self.phase();
        if phase != PurchasePhase::Idle {
            self.running.store(false, Ordering::SeqCst);
            return Err(FlowError::InvalidTransition {
                from: format!("{phase:?}"),
                to: format!("{:?}", PurchasePhase::CheckingAllowance),
            });
        }
        Ok(())
    }

    async fn run(&self, quantity: u64) -> Result<u64, FlowError> {
        if self.session.account().is_none() {
            return Err(FlowError::NoSession);
        }

        self.advance(PurchasePhase::CheckingAllowance)?;
        let snapshot = self.entitlements.refresh().await?;
        let cost = snapshot.total_cost(quantity);

        // A balance that cannot cover the cost dooms the purchase no matter
        // what the allowance says; fail before asking for any signature.
        if !snapshot.can_fund(quantity) {
            self.advance(PurchasePhase::CheckingBalance)?;
            return Err(LedgerError::InsufficientFunds {
                required: cost,
                available: snapshot.token_balance,
            }
            .into());
        }

        let snapshot = if snapshot.needs_authorization(quantity) {
            self.advance(PurchasePhase::AwaitingApproval)?;
            let request = self
                .ledger
                .submit_authorize(self.entitlements.spender(), cost)
                .await?;
            let mut tracked = self.tracker.track(request, RequestKind::Authorize);
            self.state.send_modify(|s| s.active = Some(request));
            self.advance(PurchasePhase::Approving)?;
            self.settle(&mut tracked).await?;

            // A confirmed approval invalidates every prior read; re-check
            // before trusting the allowance for the purchase.
            let refreshed = self.entitlements.refresh().await?;
            if refreshed.needs_authorization(quantity) {
                return Err(LedgerError::InsufficientAllowance {
                    required: refreshed.total_cost(quantity),
                    granted: refreshed.allowance,
                }
                .into());
            }
            refreshed
        } else {
            snapshot
        };

        self.advance(PurchasePhase::CheckingBalance)?;
        if !snapshot.can_fund(quantity) {
            return Err(LedgerError::InsufficientFunds {
                required: snapshot.total_cost(quantity),
                available: snapshot.token_balance,
            }
            .into());
        }

        self.advance(PurchasePhase::AwaitingPurchase)?;
        let request = self.ledger.submit_purchase(quantity).await?;
        let mut tracked = self.tracker.track(request, RequestKind::Purchase);
        self.state.send_modify(|s| s.active = Some(request));
        self.advance(PurchasePhase::Purchasing)?;
        self.settle(&mut tracked).await?;

        self.entitlements.invalidate();
        let snapshot = self.entitlements.refresh().await?;
        self.advance(PurchasePhase::Confirmed)?;
        self.state.send_modify(|s| {
            s.active = None;
            s.credits = Some(snapshot.credit_balance);
        });
        info!(quantity, credits = snapshot.credit_balance, "purchase confirmed");
        Ok(snapshot.credit_balance)
    }

    async fn settle(&self, tracked: &mut TrackedRequest) -> Result<(), FlowError> {
        loop {
            match tracked.wait_with_stall(self.config.stall_after).await {
                TrackOutcome::Confirmed => {
                    self.state.send_modify(|s| {
                        s.stalled = false;
                        s.active = None;
                    });
                    return Ok(());
                }
                TrackOutcome::Failed(reason) => {
                    self.state.send_modify(|s| s.stalled = false);
                    return Err(LedgerError::Reverted(reason).into());
                }
                TrackOutcome::Stalled => {
                    warn!(request = %tracked.id(), "confirmation latency above advisory interval");
                    self.state.send_modify(|s| s.stalled = true);
                }
            }
        }
    }

    fn advance(&self, next: PurchasePhase) -> Result<(), FlowError> {
        let current = self.phase();
        if !current.can_transition_to(next) {
            return Err(FlowError::InvalidTransition {
                from: format!("{current:?}"),
                to: format!("{next:?}"),
            });
        }
        debug!(from = ?current, to = ?next, "purchase flow transition");
        self.state.send_modify(|s| s.phase = next);
        self.history.lock().push(next);
        Ok(())
    }

    fn fail(&self, error: FlowError) {
        if self.phase().is_terminal() {
            return;
        }
        warn!(%error, "purchase flow failed");
        self.state.send_modify(|s| {
            s.phase = PurchasePhase::Failed;
            s.stalled = false;
            s.active = None;
            s.error = Some(error);
        });
        self.history.lock().push(PurchasePhase::Failed);
    }
}
