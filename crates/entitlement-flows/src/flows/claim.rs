//! # Claim Flow
//!
//! Drives the one-time free credit claim. Eligibility is re-validated with a
//! fresh read immediately before submission: the flag may have flipped in
//! another session or tab since this controller was created.

use crate::config::FlowConfig;
use crate::domain::{ClaimPhase, FlowError};
use crate::entitlements::EntitlementView;
use ledger_client::{LedgerClientApi, WalletSession};
use parking_lot::Mutex;
use shared_types::{LedgerError, RequestId, RequestKind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use tx_tracker::{RequestTracker, TrackOutcome, TrackedRequest};

/// Observable state of a claim flow.
#[derive(Clone, Debug, Default)]
pub struct ClaimState {
    /// Current phase.
    pub phase: ClaimPhase,
    /// Advisory: confirmation latency exceeded the configured interval.
    pub stalled: bool,
    /// The in-flight request, if any.
    pub active: Option<RequestId>,
    /// Terminal failure reason, if the flow failed.
    pub error: Option<FlowError>,
    /// Credit balance after a confirmed claim.
    pub credits: Option<u64>,
}

/// State machine for the free-claim interaction.
pub struct ClaimFlow {
    ledger: Arc<dyn LedgerClientApi>,
    tracker: Arc<RequestTracker>,
    entitlements: Arc<EntitlementView>,
    session: Arc<dyn WalletSession>,
    config: FlowConfig,
    state: watch::Sender<ClaimState>,
    running: AtomicBool,
    history: Mutex<Vec<ClaimPhase>>,
}

impl ClaimFlow {
    /// Create an idle claim flow.
    pub fn new(
        ledger: Arc<dyn LedgerClientApi>,
        tracker: Arc<RequestTracker>,
        entitlements: Arc<EntitlementView>,
        session: Arc<dyn WalletSession>,
        config: FlowConfig,
    ) -> Self {
        let (state, _) = watch::channel(ClaimState::default());
        Self {
            ledger,
            tracker,
            entitlements,
            session,
            config,
            state,
            running: AtomicBool::new(false),
            history: Mutex::new(vec![ClaimPhase::Idle]),
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> ClaimState {
        self.state.borrow().clone()
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> ClaimPhase {
        self.state.borrow().phase
    }

    /// Human-readable progress label for the current phase.
    #[must_use]
    pub fn progress_label(&self) -> &'static str {
        self.phase().label()
    }

    /// Observe state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ClaimState> {
        self.state.subscribe()
    }

    /// Every phase entered since creation (or the last reset), in order.
    #[must_use]
    pub fn transitions(&self) -> Vec<ClaimPhase> {
        self.history.lock().clone()
    }

    /// Drive the claim to its terminal phase.
    ///
    /// Returns the refreshed credit balance on confirmation.
    pub async fn start(&self) -> Result<u64, FlowError> {
        self.begin()?;
        let result = self.run().await;
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
            return Err(FlowError::RequestActive(RequestKind::Claim));
        }
        let phase = self.phase();
        if !phase.can_transition_to(ClaimPhase::Idle) {
            return Err(FlowError::InvalidTransition {
                from: format!("{phase:?}"),
                to: format!("{:?}", ClaimPhase::Idle),
            });
        }
        self.state.send_replace(ClaimState::default());
        self.history.lock().push(ClaimPhase::Idle);
        Ok(())
    }

    /// Session boundary hook: the wallet disconnected.
    pub fn fail_disconnected(&self) {
        let phase = self.phase();
        if phase != ClaimPhase::Idle && !phase.is_terminal() {
            self.fail(FlowError::NoSession);
        }
    }

    fn begin(&self) -> Result<(), FlowError> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(FlowError::RequestActive(RequestKind::Claim));
        }
        let phase = self.phase();
        if phase != ClaimPhase::Idle {
            self.running.store(false, Ordering::SeqCst);
            return Err(FlowError::InvalidTransition {
                from: format!("{phase:?}"),
                to: format!("{:?}", ClaimPhase::Submitting),
            });
        }
        Ok(())
    }

    async fn run(&self) -> Result<u64, FlowError> {
        if self.session.account().is_none() {
            return Err(FlowError::NoSession);
        }

        // Fresh read immediately before submission; never trust a snapshot
        // taken when this controller was created.
        let snapshot = self.entitlements.refresh().await?;
        if !snapshot.claim_eligible {
            debug!("free claim already used, refusing to submit");
            return Err(FlowError::NotEligible);
        }

        self.advance(ClaimPhase::Submitting)?;
        let request = self.ledger.submit_claim().await?;
        let mut tracked = self.tracker.track(request, RequestKind::Claim);
        self.state.send_modify(|s| s.active = Some(request));
        self.settle(&mut tracked).await?;

        self.entitlements.invalidate();
        let snapshot = self.entitlements.refresh().await?;
        self.advance(ClaimPhase::Confirmed)?;
        self.state.send_modify(|s| {
            s.active = None;
            s.credits = Some(snapshot.credit_balance);
        });
        info!(credits = snapshot.credit_balance, "free claim confirmed");
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

    fn advance(&self, next: ClaimPhase) -> Result<(), FlowError> {
        let current = self.phase();
        if !current.can_transition_to(next) {
            return Err(FlowError::InvalidTransition {
                from: format!("{current:?}"),
                to: format!("{next:?}"),
            });
        }
        debug!(from = ?current, to = ?next, "claim flow transition");
        self.state.send_modify(|s| s.phase = next);
        self.history.lock().push(next);
        Ok(())
    }

    fn fail(&self, error: FlowError) {
        if self.phase().is_terminal() {
            return;
        }
        warn!(%error, "claim flow failed");
        self.state.send_modify(|s| {
            s.phase = ClaimPhase::Failed;
            s.stalled = false;
            s.active = None;
            s.error = Some(error);
        });
        self.history.lock().push(ClaimPhase::Failed);
    }
}
