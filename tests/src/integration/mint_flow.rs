//! # Mint Flow Integration
//!
//! Routine-record minting over the wired stack: private payload handling and
//! record-id discovery by re-read.

#[cfg(test)]
mod tests {
    use crate::fixtures::{user, Harness};
    use entitlement_flows::{MintPhase, RoutineDescriptor};
    use ledger_client::LedgerClientApi;
    use shared_types::RequestKind;
    use std::sync::Arc;
    use std::time::Duration;

    fn routine() -> RoutineDescriptor {
        RoutineDescriptor {
            skin_type: "Oily".to_string(),
            concerns: "Acne".to_string(),
            products: "Salicylic cleanser, niacinamide serum".to_string(),
            routine: "AM: cleanse, serum, SPF. PM: cleanse, treatment.".to_string(),
        }
    }

    #[tokio::test]
    async fn test_mint_end_to_end_with_manual_settlement() {
        let harness = Harness::new(0);
        let flow = Arc::new(harness.mint_flow());

        let driver = tokio::spawn({
            let flow = flow.clone();
            async move { flow.start(routine()).await }
        });

        let mut rounds = 0;
        while harness.ledger.pending_count() == 0 {
            tokio::time::sleep(Duration::from_millis(2)).await;
            rounds += 1;
            assert!(rounds < 500, "mint was never submitted");
        }
        harness.ledger.settle_all();

        let record = driver.await.expect("flow driver panicked").unwrap();
        assert_eq!(record, 1);
        assert_eq!(flow.phase(), MintPhase::Confirmed);
        assert_eq!(flow.state().record, Some(1));

        // The record list, not the notification, is the source of truth.
        assert_eq!(harness.ledger.records_of(user()).await.unwrap(), vec![1]);
        assert_eq!(harness.ledger.submissions(), vec![RequestKind::Mint]);
    }

    #[tokio::test]
    async fn test_repeated_mints_accumulate_records() {
        let harness = Harness::auto(0);

        let first = harness.mint_flow();
        assert_eq!(first.start(routine()).await.unwrap(), 1);

        let second = harness.mint_flow();
        assert_eq!(second.start(routine()).await.unwrap(), 2);

        assert_eq!(
            harness.ledger.records_of(user()).await.unwrap(),
            vec![1, 2]
        );
    }
}
