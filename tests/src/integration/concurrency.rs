//! # Concurrency
//!
//! Many writers on one ledger: no lost writes, no leaked cursors.

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use gl_02_record_lifecycle::RecordLifecycleApi;
    use gl_03_aggregation_gateway::{AggregationService, DcDmRequest, GatewayConfig};

    use crate::fixtures::{memory_ledger, service_for};

    const WRITERS: usize = 64;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_are_all_retrievable() {
        let ledger = memory_ledger();
        let contract = ledger.contract();

        let mut handles = Vec::with_capacity(WRITERS);
        for i in 0..WRITERS {
            let contract = Arc::clone(&contract);
            handles.push(tokio::task::spawn_blocking(move || {
                contract
                    .api()
                    .create_record(&format!("rec-{i:03}"), &i.to_string(), "0", &(i % 4).to_string())
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let all = contract.api().query_all_records().unwrap();
        assert_eq!(all.len(), WRITERS);
        for i in 0..WRITERS {
            let record = contract.api().query_record(&format!("rec-{i:03}")).unwrap();
            assert_eq!(record.dm_value, i.to_string());
        }
        let per_epoch: usize = (0..4)
            .map(|e| contract.api().query_records_by_epoch(&e.to_string()).unwrap().len())
            .sum();
        assert_eq!(per_epoch, WRITERS);
        assert_eq!(ledger.store().open_cursors(), 0);
        ledger.store().verify_write_log().unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_send_dc_dm_same_epoch() {
        let ledger = memory_ledger();
        let svc: Arc<AggregationService> =
            Arc::new(service_for(&ledger, &GatewayConfig::default()));

        let mut handles = Vec::with_capacity(WRITERS);
        for i in 0..WRITERS {
            let svc = Arc::clone(&svc);
            handles.push(tokio::spawn(async move {
                svc.send_dc_dm(DcDmRequest::new(i.to_string(), "0", "shared"))
                    .await
            }));
        }

        let mut counts = Vec::with_capacity(WRITERS);
        for handle in handles {
            let reply = handle.await.unwrap().unwrap();
            counts.push(reply.count().unwrap());
        }

        // Each reply saw at least its own record, and the last one saw all.
        assert!(counts.iter().all(|&c| (1..=WRITERS).contains(&c)));
        assert!(counts.contains(&WRITERS));

        let stored: BTreeSet<String> = svc
            .query_records_by_epoch("shared")
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.record.dm_value)
            .collect();
        assert_eq!(stored.len(), WRITERS);
        assert_eq!(ledger.store().open_cursors(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_revokes_converge() {
        let ledger = memory_ledger();
        ledger.seed_if_empty().unwrap();
        let contract = ledger.contract();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let contract = Arc::clone(&contract);
            handles.push(tokio::task::spawn_blocking(move || {
                contract.api().revoke_gradients("REC3")
            }));
        }
        for handle in handles {
            // A racing writer may lose with a retryable conflict; never a lost revoke.
            if let Err(e) = handle.await.unwrap() {
                assert!(e.is_retryable(), "unexpected error: {e}");
            }
        }
        assert!(contract.api().query_record("REC3").unwrap().revoked);
    }
}
