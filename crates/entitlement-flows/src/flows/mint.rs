//! # Mint Flow
//!
//! Drives a routine-record mint. The routine body is serialized privately
//! and only its derived content reference travels with the public record;
//! the assigned record identifier is learned by re-reading the account's
//! records after confirmation, never from the notification payload.

use crate::config::FlowConfig;
use crate::domain::{FlowError, MintArtifacts, MintPhase, RoutineDescriptor};
use crate::entitlements::EntitlementView;
use ledger_client::{LedgerClientApi, WalletSession};
use parking_lot::Mutex;
use shared_types::{LedgerError, RecordId, RequestId, RequestKind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use tx_tracker::{RequestTracker, TrackOutcome, TrackedRequest};

/// Observable state of a mint flow.
#[derive(Clone, Debug, Default)]
pub struct MintState {
    /// Current phase.
    pub phase: MintPhase,
    /// Advisory: confirmation latency exceeded the configured interval.
    pub stalled: bool,
    /// The in-flight request, if any.
    pub active: Option<RequestId>,
    /// Terminal failure reason, if the flow failed.
    pub error: Option<FlowError>,
    /// Identifier of the minted record after confirmation.
    pub record: Option<RecordId>,
}

/// State machine for one record-mint interaction.
pub struct MintFlow {
    ledger: Arc<dyn LedgerClientApi>,
    tracker: Arc<RequestTracker>,
    entitlements: Arc<EntitlementView>,
    session: Arc<dyn WalletSession>,
    config: FlowConfig,
    state: watch::Sender<MintState>,
    running: AtomicBool,
    history: Mutex<Vec<MintPhase>>,
}

impl MintFlow {
    /// Create an idle mint flow.
    pub fn new(
        ledger: Arc<dyn LedgerClientApi>,
        tracker: Arc<RequestTracker>,
        entitlements: Arc<EntitlementView>,
        session: Arc<dyn WalletSession>,
        config: FlowConfig,
    ) -> Self {
        let (state, _) = watch::channel(MintState::default());
        Self {
            ledger,
            tracker,
            entitlements,
            session,
            config,
            state,
            running: AtomicBool::new(false),
            history: Mutex::new(vec![MintPhase::Idle]),
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> MintState {
        self.state.borrow().clone()
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> MintPhase {
        self.state.borrow().phase
    }

    /// Human-readable progress label for the current phase.
    #[must_use]
    pub fn progress_label(&self) -> &'static str {
        self.phase().label()
    }

    /// Observe state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<MintState> {
        self.state.subscribe()
    }

    /// Every phase entered since creation (or the last reset), in order.
    #[must_use]
    pub fn transitions(&self) -> Vec<MintPhase> {
        self.history.lock().clone()
    }

    /// Drive a mint of `routine` to its terminal phase.
    ///
    /// Returns the ledger-assigned record identifier on confirmation.
    pub async fn start(&self, routine: RoutineDescriptor) -> Result<RecordId, FlowError> {
        self.begin()?;
        let result = self.run(routine).await;
        self.running.store(false, Ordering::SeqCst);
        match result {
            Ok(record) => Ok(record),
            Err(error) => {
                self.fail(error.clone());
                Err(error)
            }
        }
    }

    /// Return a terminal flow to `Idle`, clearing all residual state.
    pub fn reset(&self) -> Result<(), FlowError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(FlowError::RequestActive(RequestKind::Mint));
        }
        let phase = self.phase();
        if !phase.can_transition_to(MintPhase::Idle) {
            return Err(FlowError::InvalidTransition {
                from: format!("{phase:?}"),
                to: format!("{:?}", MintPhase::Idle),
            });
        }
        self.state.send_replace(MintState::default());
        self.history.lock().push(MintPhase::Idle);
        Ok(())
    }

    /// Session boundary hook: the wallet disconnected.
    pub fn fail_disconnected(&self) {
        let phase = self.phase();
        if phase != MintPhase::Idle && !phase.is_terminal() {
            self.fail(FlowError::NoSession);
        }
    }

    fn begin(&self) -> Result<(), FlowError> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(FlowError::RequestActive(RequestKind::Mint));
        }
        let phase = self.phase();
        if phase != MintPhase::Idle {
            self.running.store(false, Ordering::SeqCst);
            return Err(FlowError::InvalidTransition {
                from: format!("{phase:?}"),
                to: format!("{:?}", MintPhase::Submitting),
            });
        }
        Ok(())
    }

    async fn run(&self, routine: RoutineDescriptor) -> Result<RecordId, FlowError> {
        let Some(account) = self.session.account() else {
            return Err(FlowError::NoSession);
        };

        let artifacts = MintArtifacts::prepare(&routine)?;
        debug!(private_ref = %artifacts.private_ref, "mint payloads prepared");

        self.advance(MintPhase::Submitting)?;
        let request = self
            .ledger
            .submit_mint(account, artifacts.public_uri, artifacts.private_ref)
            .await?;
        let mut tracked = self.tracker.track(request, RequestKind::Mint);
        self.state.send_modify(|s| s.active = Some(request));
        self.settle(&mut tracked).await?;

        // The notification only tells us to re-read; the record list is the
        // source of truth for the assigned identifier.
        self.entitlements.invalidate();
        let records = self.ledger.records_of(account).await?;
        let record = records.last().copied().ok_or_else(|| {
            LedgerError::Unavailable("minted record not yet visible".to_string())
        })?;

        self.advance(MintPhase::Confirmed)?;
        self.state.send_modify(|s| {
            s.active = None;
            s.record = Some(record);
        });
        info!(record, "routine record minted");
        Ok(record)
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

    fn advance(&self, next: MintPhase) -> Result<(), FlowError> {
        let current = self.phase();
        if !current.can_transition_to(next) {
            return Err(FlowError::InvalidTransition {
                from: format!("{current:?}"),
                to: format!("{next:?}"),
            });
        }
        debug!(from = ?current, to = ?next, "mint flow transition");
        self.state.send_modify(|s| s.phase = next);
        self.history.lock().push(next);
        Ok(())
    }

    fn fail(&self, error: FlowError) {
        if self.phase().is_terminal() {
            return;
        }
        warn!(%error, "mint flow failed");
        self.state.send_modify(|s| {
            s.phase = MintPhase::Failed;
            s.stalled = false;
            s.active = None;
            s.error = Some(error);
        });
        self.history.lock().push(MintPhase::Failed);
    }
}
