//! # End-to-End: SendDcDm
//!
//! Client → Gateway → CreateRecord → QueryRecordByEpochID → reduce → reply,
//! against a real in-process ledger.

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use gl_02_record_lifecycle::RecordLifecycleApi;
    use gl_03_aggregation_gateway::{DcDmReply, DcDmRequest, GatewayConfig, RevokedPolicy};

    use crate::fixtures::{memory_ledger, service_for, unindexed_ledger};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn pairs(reply: &DcDmReply) -> BTreeSet<(String, String)> {
        reply
            .aggregated_a
            .split(", ")
            .zip(reply.aggregated_b.split(", "))
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect()
    }

    fn pair(a: &str, b: &str) -> (String, String) {
        (a.to_string(), b.to_string())
    }

    // =============================================================================
    // SCENARIOS
    // =============================================================================

    #[tokio::test]
    async fn test_epoch_scenario() {
        let ledger = memory_ledger();
        let svc = service_for(&ledger, &GatewayConfig::default());

        let first = svc.send_dc_dm(DcDmRequest::new("0.5", "0.1", "7")).await.unwrap();
        assert_eq!(first.count, "1");
        assert_eq!(first.aggregated_a, "0.5");
        assert_eq!(first.aggregated_b, "0.1");

        // A different epoch in between.
        let other = svc.send_dc_dm(DcDmRequest::new("0.6", "0.2", "8")).await.unwrap();
        assert_eq!(other.count, "1");

        let second = svc.send_dc_dm(DcDmRequest::new("0.6", "0.2", "7")).await.unwrap();
        assert_eq!(second.count, "2");
        assert_eq!(second.count(), Some(2));
        assert_eq!(
            pairs(&second),
            BTreeSet::from([pair("0.5", "0.1"), pair("0.6", "0.2")])
        );

        // Only the epoch 8 record is in epoch 8.
        let api = ledger.contract();
        assert_eq!(api.api().query_records_by_epoch("8").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_scenario_without_index() {
        let ledger = unindexed_ledger();
        let svc = service_for(&ledger, &GatewayConfig::default());

        svc.send_dc_dm(DcDmRequest::new("0.5", "0.1", "7")).await.unwrap();
        svc.send_dc_dm(DcDmRequest::new("0.6", "0.2", "8")).await.unwrap();
        let reply = svc.send_dc_dm(DcDmRequest::new("0.6", "0.2", "7")).await.unwrap();

        assert_eq!(reply.count, "2");
        assert_eq!(
            pairs(&reply),
            BTreeSet::from([pair("0.5", "0.1"), pair("0.6", "0.2")])
        );
    }

    #[tokio::test]
    async fn test_seed_epoch_is_separate() {
        let ledger = memory_ledger();
        ledger.seed_if_empty().unwrap();
        let svc = service_for(&ledger, &GatewayConfig::default());

        let reply = svc.send_dc_dm(DcDmRequest::new("1.0", "2.0", "-1")).await.unwrap();
        assert_eq!(reply.count, "6");

        let reply = svc.send_dc_dm(DcDmRequest::new("1.0", "2.0", "0")).await.unwrap();
        assert_eq!(reply.count, "1");
    }

    #[tokio::test]
    async fn test_revoked_records_follow_policy() {
        let ledger = memory_ledger();
        let include = service_for(&ledger, &GatewayConfig::default());
        let mut config = GatewayConfig::default();
        config.aggregation.revoked_policy = RevokedPolicy::Exclude;
        let exclude = service_for(&ledger, &config);

        include.send_dc_dm(DcDmRequest::new("0.5", "0.1", "7")).await.unwrap();
        let key = include.query_records_by_epoch("7").await.unwrap()[0].key.clone();
        include.revoke_gradients(&key).await.unwrap();

        let reply = include.send_dc_dm(DcDmRequest::new("0.6", "0.2", "7")).await.unwrap();
        assert_eq!(reply.count, "2");

        let reply = exclude.send_dc_dm(DcDmRequest::new("0.7", "0.3", "7")).await.unwrap();
        assert_eq!(reply.count, "2");
        assert!(!reply.aggregated_a.contains("0.5"));
    }

    #[tokio::test]
    async fn test_values_are_not_interpreted() {
        let ledger = memory_ledger();
        let svc = service_for(&ledger, &GatewayConfig::default());

        let reply = svc
            .send_dc_dm(DcDmRequest::new("[0.1 0.2]", "not a number", "epoch/α"))
            .await
            .unwrap();
        assert_eq!(reply.aggregated_a, "[0.1 0.2]");
        assert_eq!(reply.aggregated_b, "not a number");
        assert_eq!(reply.count, "1");
    }
}
