//! # Credits Client Runtime
//!
//! Composition root wiring the full stack together: wallet session → ledger
//! adapter → request tracker → entitlement view → flow machines. Drives the
//! free claim, a credit purchase, and a record mint end to end against the
//! in-memory ledger so the whole choreography can be observed from the logs.

use anyhow::{Context, Result};
use entitlement_flows::{
    ClaimFlow, EntitlementView, FlowConfig, MintFlow, PurchaseFlow, RoutineDescriptor,
};
use ledger_client::{
    EventFilter, InMemoryLedger, LedgerClientApi, LedgerClientConfig, StaticWallet,
};
use primitive_types::U256;
use shared_types::Account;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use tx_tracker::RequestTracker;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let account = Account::new([0x42; 20]);
    let config = LedgerClientConfig::for_testing();
    let spender = config.credits_contract;

    // Wiring: session → adapter → tracker → view → flows.
    let wallet = Arc::new(StaticWallet::connected(account));
    let ledger = Arc::new(InMemoryLedger::with_balances(
        config,
        wallet.clone(),
        &[(account, U256::from(25_000_000u64))],
    ));
    ledger.set_auto_confirm(true);

    let tracker = Arc::new(RequestTracker::spawn(
        ledger.subscribe(EventFilter::settlement()),
    ));
    let entitlements = Arc::new(EntitlementView::new(
        ledger.clone() as Arc<dyn LedgerClientApi>,
        wallet.clone(),
        spender,
    ));
    let _invalidator =
        entitlements.spawn_invalidator(ledger.subscribe(EventFilter::all().for_account(account)));

    let snapshot = entitlements.snapshot().await?;
    info!(
        account = %snapshot.account,
        credits = snapshot.credit_balance,
        balance = %snapshot.token_balance,
        "connected"
    );

    // One-time free claim.
    let claim = ClaimFlow::new(
        ledger.clone(),
        tracker.clone(),
        entitlements.clone(),
        wallet.clone(),
        FlowConfig::default(),
    );
    let credits = claim.start().await.context("free claim failed")?;
    info!(credits, label = claim.progress_label(), "claim finished");

    // Purchase three credits (allowance starts at zero, so this runs the
    // approval prerequisite first).
    let purchase = PurchaseFlow::new(
        ledger.clone(),
        tracker.clone(),
        entitlements.clone(),
        wallet.clone(),
        FlowConfig::default(),
    );
    let credits = purchase.start(3).await.context("purchase failed")?;
    info!(credits, label = purchase.progress_label(), "purchase finished");

    // Mint a routine record.
    let mint = MintFlow::new(
        ledger.clone(),
        tracker,
        entitlements.clone(),
        wallet,
        FlowConfig::default(),
    );
    let routine = RoutineDescriptor {
        skin_type: "Combination".to_string(),
        concerns: "Dehydration".to_string(),
        products: "Gentle cleanser, hyaluronic serum, SPF 30".to_string(),
        routine: "AM: cleanse, serum, SPF. PM: cleanse, serum.".to_string(),
    };
    let record = mint.start(routine).await.context("mint failed")?;
    info!(record, "mint finished");

    let snapshot = entitlements.snapshot().await?;
    info!(
        credits = snapshot.credit_balance,
        balance = %snapshot.token_balance,
        allowance = %snapshot.allowance,
        claim_eligible = snapshot.claim_eligible,
        "final entitlement state"
    );

    Ok(())
}
