//! # Purchase Flow Integration
//!
//! End-to-end purchase choreography over the wired stack, including the
//! exact transition sequences for the three canonical pricing scenarios.

#[cfg(test)]
mod tests {
    use crate::fixtures::{usdc, user, Harness};
    use entitlement_flows::{FlowError, PurchaseFlow, PurchasePhase};
    use shared_types::{LedgerError, RequestKind};
    use std::sync::Arc;
    use std::time::Duration;

    /// Drive a manually settled flow to its terminal phase.
    async fn drive(
        harness: &Harness,
        flow: &Arc<PurchaseFlow>,
        quantity: u64,
    ) -> Result<u64, FlowError> {
        let driver = tokio::spawn({
            let flow = flow.clone();
            async move { flow.start(quantity).await }
        });
        let mut rounds = 0;
        while !flow.phase().is_terminal() {
            harness.ledger.settle_all();
            tokio::time::sleep(Duration::from_millis(2)).await;
            rounds += 1;
            assert!(rounds < 1000, "flow never reached a terminal phase");
        }
        driver.await.expect("flow driver panicked")
    }

    #[tokio::test]
    async fn test_scenario_approval_required() {
        // price=5, N=1, A=0, B=10
        let harness = Harness::auto(10_000_000);
        let flow = harness.purchase_flow();

        let credits = flow.start(1).await.unwrap();

        assert_eq!(credits, 1);
        assert_eq!(
            flow.transitions(),
            vec![
                PurchasePhase::Idle,
                PurchasePhase::CheckingAllowance,
                PurchasePhase::AwaitingApproval,
                PurchasePhase::Approving,
                PurchasePhase::CheckingBalance,
                PurchasePhase::AwaitingPurchase,
                PurchasePhase::Purchasing,
                PurchasePhase::Confirmed,
            ]
        );
        assert_eq!(
            harness.ledger.submissions(),
            vec![RequestKind::Authorize, RequestKind::Purchase]
        );
    }

    #[tokio::test]
    async fn test_scenario_approval_skipped() {
        // price=5, N=5, A=25, B=25
        let harness = Harness::auto(25_000_000);
        harness
            .ledger
            .set_allowance(user(), harness.entitlements.spender(), usdc(25_000_000));
        let flow = harness.purchase_flow();

        let credits = flow.start(5).await.unwrap();

        assert_eq!(credits, 5);
        assert_eq!(
            flow.transitions(),
            vec![
                PurchasePhase::Idle,
                PurchasePhase::CheckingAllowance,
                PurchasePhase::CheckingBalance,
                PurchasePhase::AwaitingPurchase,
                PurchasePhase::Purchasing,
                PurchasePhase::Confirmed,
            ]
        );
        assert_eq!(harness.ledger.submissions(), vec![RequestKind::Purchase]);
    }

    #[tokio::test]
    async fn test_scenario_insufficient_funds() {
        // price=5, N=1, B=3
        let harness = Harness::auto(3_000_000);
        let flow = harness.purchase_flow();

        let result = flow.start(1).await;

        assert!(matches!(
            result,
            Err(FlowError::Ledger(LedgerError::InsufficientFunds { .. }))
        ));
        assert_eq!(
            flow.transitions(),
            vec![
                PurchasePhase::Idle,
                PurchasePhase::CheckingAllowance,
                PurchasePhase::CheckingBalance,
                PurchasePhase::Failed,
            ]
        );
        assert!(harness.ledger.submissions().is_empty());
    }

    #[tokio::test]
    async fn test_approval_submitted_iff_allowance_short() {
        // (pre-set allowance, quantity, approval expected)
        let cases = [
            (0u64, 1u64, true),
            (4_999_999, 1, true),
            (5_000_000, 1, false),
            (9_999_999, 2, true),
            (10_000_000, 2, false),
            (25_000_000, 3, false),
        ];

        for (allowance, quantity, expect_approval) in cases {
            let harness = Harness::auto(100_000_000);
            harness
                .ledger
                .set_allowance(user(), harness.entitlements.spender(), usdc(allowance));
            let flow = harness.purchase_flow();

            flow.start(quantity).await.unwrap();

            let submissions = harness.ledger.submissions();
            assert_eq!(
                submissions.contains(&RequestKind::Authorize),
                expect_approval,
                "allowance={allowance} quantity={quantity}"
            );
            assert_eq!(
                flow.transitions().contains(&PurchasePhase::AwaitingApproval),
                expect_approval,
                "allowance={allowance} quantity={quantity}"
            );
            // The purchase itself always went out.
            assert_eq!(
                submissions.last(),
                Some(&RequestKind::Purchase),
                "allowance={allowance} quantity={quantity}"
            );
        }
    }

    #[tokio::test]
    async fn test_stall_advisory_is_not_terminal() {
        let harness = Harness::new(10_000_000);
        let flow = Arc::new(harness.purchase_flow());

        let driver = tokio::spawn({
            let flow = flow.clone();
            async move { flow.start(1).await }
        });

        // Let the approval sit unsettled past the advisory interval.
        let mut rounds = 0;
        while !flow.state().stalled {
            tokio::time::sleep(Duration::from_millis(5)).await;
            rounds += 1;
            assert!(rounds < 200, "stall advisory never raised");
        }
        assert_eq!(flow.phase(), PurchasePhase::Approving);

        // Settling clears the advisory and the flow completes normally.
        while !flow.phase().is_terminal() {
            harness.ledger.settle_all();
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        let credits = driver.await.expect("flow driver panicked").unwrap();
        assert_eq!(credits, 1);
        assert!(!flow.state().stalled);
    }

    #[tokio::test]
    async fn test_reverted_purchase_reaches_failed() {
        let harness = Harness::new(10_000_000);
        harness
            .ledger
            .set_allowance(user(), harness.entitlements.spender(), usdc(5_000_000));
        let flow = Arc::new(harness.purchase_flow());

        let driver = tokio::spawn({
            let flow = flow.clone();
            async move { flow.start(1).await }
        });

        // Wait for the purchase submission, then force an on-chain failure.
        let mut rounds = 0;
        while harness.ledger.pending_count() == 0 {
            tokio::time::sleep(Duration::from_millis(2)).await;
            rounds += 1;
            assert!(rounds < 500, "purchase was never submitted");
        }
        harness.ledger.revert_next("execution reverted");

        let result = driver.await.expect("flow driver panicked");
        assert_eq!(
            result,
            Err(FlowError::Ledger(LedgerError::Reverted(
                "execution reverted".to_string()
            )))
        );
        assert_eq!(flow.phase(), PurchasePhase::Failed);
        assert!(flow.state().error.is_some());

        // Reset leaves no residual allowance assumptions; a fresh start
        // re-reads everything.
        flow.reset().unwrap();
        assert_eq!(flow.phase(), PurchasePhase::Idle);
    }

    #[tokio::test]
    async fn test_manual_settlement_end_to_end() {
        let harness = Harness::new(25_000_000);
        let flow = Arc::new(harness.purchase_flow());
        let observer = flow.subscribe();

        let credits = drive(&harness, &flow, 3).await.unwrap();
        assert_eq!(credits, 3);
        assert_eq!(flow.phase(), PurchasePhase::Confirmed);
        assert_eq!(flow.state().credits, Some(3));

        // A presentation-side observer sees the same terminal state.
        let observed = observer.borrow().clone();
        assert_eq!(observed.phase, PurchasePhase::Confirmed);
        assert_eq!(observed.credits, Some(3));
    }

    #[tokio::test]
    async fn test_teardown_divergence_reconciled_by_next_read() {
        let harness = Harness::new(10_000_000);
        harness
            .ledger
            .set_allowance(user(), harness.entitlements.spender(), usdc(5_000_000));
        let flow = Arc::new(harness.purchase_flow());

        let driver = tokio::spawn({
            let flow = flow.clone();
            async move { flow.start(1).await }
        });

        let mut rounds = 0;
        while harness.ledger.pending_count() == 0 {
            tokio::time::sleep(Duration::from_millis(2)).await;
            rounds += 1;
            assert!(rounds < 500, "purchase was never submitted");
        }

        // The observing controller dies; the ledger request does not.
        driver.abort();
        harness.ledger.settle_all();

        // The next entitlement read is authoritative regardless of the
        // orphaned controller's final state.
        let snapshot = harness.entitlements.refresh().await.unwrap();
        assert_eq!(snapshot.credit_balance, 1);
        assert_eq!(snapshot.token_balance, usdc(5_000_000));
    }
}
