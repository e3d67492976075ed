//! # Interleaving Invariants
//!
//! Randomized start/confirm/fail interleavings checking the
//! single-active-request invariant, plus independent controllers running
//! concurrently.

#[cfg(test)]
mod tests {
    use crate::fixtures::{usdc, user, Harness};
    use ledger_client::{LedgerClientApi, FREE_CLAIM_CREDITS};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_single_active_request_under_random_interleavings() {
        let mut rng = StdRng::seed_from_u64(0xFACE);

        for round in 0..24 {
            let harness = Harness::new(50_000_000);
            let flow = Arc::new(harness.purchase_flow());

            let driver = tokio::spawn({
                let flow = flow.clone();
                async move { flow.start(2).await }
            });

            let mut steps = 0;
            while !flow.phase().is_terminal() {
                match rng.gen_range(0..4) {
                    0 => {
                        harness.ledger.settle_next();
                    }
                    1 => {
                        if rng.gen_bool(0.5) {
                            harness.ledger.revert_next("interleaved failure");
                        }
                    }
                    2 => {
                        // A competing start must never be accepted while the
                        // first interaction is unresolved.
                        assert!(flow.start(1).await.is_err(), "round {round}");
                    }
                    _ => {}
                }
                tokio::time::sleep(Duration::from_millis(1)).await;

                // Never more than one in-flight submission per controller.
                assert!(
                    harness.ledger.pending_count() <= 1,
                    "round {round}: double submission observed"
                );

                steps += 1;
                assert!(steps < 2000, "round {round}: flow never terminated");
            }

            // Whatever the interleaving, the driver observed a single
            // coherent outcome.
            let _ = driver.await.expect("flow driver panicked");
        }
    }

    #[tokio::test]
    async fn test_independent_controllers_run_concurrently() {
        let harness = Harness::new(25_000_000);
        let purchase = Arc::new(harness.purchase_flow());
        let claim = Arc::new(harness.claim_flow());

        let purchase_driver = tokio::spawn({
            let purchase = purchase.clone();
            async move { purchase.start(3).await }
        });
        let claim_driver = tokio::spawn({
            let claim = claim.clone();
            async move { claim.start().await }
        });

        let mut rounds = 0;
        while !(purchase.phase().is_terminal() && claim.phase().is_terminal()) {
            harness.ledger.settle_all();
            tokio::time::sleep(Duration::from_millis(2)).await;
            rounds += 1;
            assert!(rounds < 1000, "flows never terminated");
        }

        let purchased = purchase_driver.await.expect("purchase driver panicked");
        let claimed = claim_driver.await.expect("claim driver panicked");
        assert!(purchased.is_ok());
        assert!(claimed.is_ok());

        // Disjoint request kinds, no shared lock: both landed.
        let snapshot = harness.entitlements.refresh().await.unwrap();
        assert_eq!(snapshot.credit_balance, 3 + FREE_CLAIM_CREDITS);
        assert_eq!(snapshot.token_balance, usdc(10_000_000));
        assert!(!harness.ledger.claim_eligibility(user()).await.unwrap());
    }
}
