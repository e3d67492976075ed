//! # Test Fixtures
//!
//! One harness wiring the full stack the way the runtime does: wallet
//! session → in-memory ledger → request tracker → entitlement view → flows.

use entitlement_flows::{ClaimFlow, EntitlementView, FlowConfig, MintFlow, PurchaseFlow};
use ledger_client::{EventFilter, InMemoryLedger, LedgerClientApi, LedgerClientConfig, StaticWallet};
use primitive_types::U256;
use shared_types::{Account, TokenAmount};
use std::sync::Arc;
use tx_tracker::RequestTracker;

/// The connected test account.
pub fn user() -> Account {
    Account::new([0xFAu8; 20])
}

/// Convenience constructor for 6-decimal token amounts.
pub fn usdc(units: u64) -> TokenAmount {
    U256::from(units)
}

/// Fully wired client stack over a simulated chain.
pub struct Harness {
    /// The connected account.
    pub account: Account,
    /// Scriptable wallet session.
    pub wallet: Arc<StaticWallet>,
    /// Simulated ledger.
    pub ledger: Arc<InMemoryLedger>,
    /// Settlement tracker.
    pub tracker: Arc<RequestTracker>,
    /// Entitlement view.
    pub entitlements: Arc<EntitlementView>,
}

impl Harness {
    /// Build a harness with manual settlement and the given token balance.
    pub fn new(balance: u64) -> Self {
        let config = LedgerClientConfig::for_testing();
        let spender = config.credits_contract;
        let wallet = Arc::new(StaticWallet::connected(user()));
        let ledger = Arc::new(InMemoryLedger::with_balances(
            config,
            wallet.clone(),
            &[(user(), usdc(balance))],
        ));
        let tracker = Arc::new(RequestTracker::spawn(
            ledger.subscribe(EventFilter::settlement()),
        ));
        let entitlements = Arc::new(EntitlementView::new(
            ledger.clone(),
            wallet.clone(),
            spender,
        ));
        Self {
            account: user(),
            wallet,
            ledger,
            tracker,
            entitlements,
        }
    }

    /// Build a harness that settles every submission immediately.
    pub fn auto(balance: u64) -> Self {
        let harness = Self::new(balance);
        harness.ledger.set_auto_confirm(true);
        harness
    }

    /// A fresh purchase flow over this stack.
    pub fn purchase_flow(&self) -> PurchaseFlow {
        PurchaseFlow::new(
            self.ledger.clone(),
            self.tracker.clone(),
            self.entitlements.clone(),
            self.wallet.clone(),
            FlowConfig::for_testing(),
        )
    }

    /// A fresh claim flow over this stack.
    pub fn claim_flow(&self) -> ClaimFlow {
        ClaimFlow::new(
            self.ledger.clone(),
            self.tracker.clone(),
            self.entitlements.clone(),
            self.wallet.clone(),
            FlowConfig::for_testing(),
        )
    }

    /// A fresh mint flow over this stack.
    pub fn mint_flow(&self) -> MintFlow {
        MintFlow::new(
            self.ledger.clone(),
            self.tracker.clone(),
            self.entitlements.clone(),
            self.wallet.clone(),
            FlowConfig::for_testing(),
        )
    }
}
