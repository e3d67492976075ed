//! # Claim Flow Integration
//!
//! The one-time free claim over the wired stack, including the eligibility
//! race and the double-submission guard.

#[cfg(test)]
mod tests {
    use crate::fixtures::{user, Harness};
    use entitlement_flows::{ClaimPhase, FlowError};
    use ledger_client::{LedgerClientApi, FREE_CLAIM_CREDITS};
    use shared_types::{LedgerError, RequestKind};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_claim_end_to_end() {
        let harness = Harness::auto(0);
        let flow = harness.claim_flow();

        let credits = flow.start().await.unwrap();

        assert_eq!(credits, FREE_CLAIM_CREDITS);
        assert_eq!(flow.phase(), ClaimPhase::Confirmed);
        assert!(!harness.ledger.claim_eligibility(user()).await.unwrap());

        let snapshot = harness.entitlements.snapshot().await.unwrap();
        assert_eq!(snapshot.credit_balance, FREE_CLAIM_CREDITS);
        assert!(!snapshot.can_claim_free(false));
    }

    #[tokio::test]
    async fn test_rejected_claim_leaves_eligibility_unchanged() {
        let harness = Harness::auto(0);
        harness.wallet.reject_kind(RequestKind::Claim);
        let flow = harness.claim_flow();

        let result = flow.start().await;

        assert_eq!(result, Err(FlowError::Ledger(LedgerError::Rejected)));
        assert_eq!(flow.phase(), ClaimPhase::Failed);
        assert_eq!(flow.state().error, Some(LedgerError::Rejected.into()));
        assert!(harness.ledger.claim_eligibility(user()).await.unwrap());
    }

    #[tokio::test]
    async fn test_eligibility_flip_between_creation_and_start() {
        let harness = Harness::auto(0);
        let flow = harness.claim_flow();

        // Eligibility was true when the controller was created; another
        // session claims first.
        assert!(harness.entitlements.snapshot().await.unwrap().claim_eligible);
        harness.ledger.mark_claimed(user());

        assert_eq!(flow.start().await, Err(FlowError::NotEligible));
        assert!(harness.ledger.submissions().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_start_is_refused() {
        let harness = Harness::new(0);
        let flow = Arc::new(harness.claim_flow());

        let driver = tokio::spawn({
            let flow = flow.clone();
            async move { flow.start().await }
        });

        let mut rounds = 0;
        while harness.ledger.pending_count() == 0 {
            tokio::time::sleep(Duration::from_millis(2)).await;
            rounds += 1;
            assert!(rounds < 500, "claim was never submitted");
        }

        // A second start while the first claim is pending must not produce
        // a second submission.
        let second = flow.start().await;
        assert!(second.is_err());
        assert_eq!(harness.ledger.submissions(), vec![RequestKind::Claim]);

        harness.ledger.settle_all();
        let credits = driver.await.expect("flow driver panicked").unwrap();
        assert_eq!(credits, FREE_CLAIM_CREDITS);
    }
}
