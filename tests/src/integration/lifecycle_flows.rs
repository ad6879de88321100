//! # Lifecycle Flows
//!
//! Record lifecycle properties exercised through the deployed contract and
//! checked against the raw store.

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use gl_01_record_store::{KeyValue, LedgerStore};
    use gl_02_record_lifecycle::{LifecycleError, RecordLifecycleApi};

    use crate::fixtures::memory_ledger;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn scan(store: &dyn LedgerStore) -> Vec<KeyValue> {
        store
            .range_scan("", "")
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    // =============================================================================
    // PROPERTIES
    // =============================================================================

    #[test]
    fn test_init_ledger_seeds_five_records() {
        let ledger = memory_ledger();
        ledger.seed_if_empty().unwrap();

        let contract = ledger.contract();
        let all = contract.api().query_all_records().unwrap();
        let ids: Vec<&str> = all.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(ids, vec!["REC0", "REC1", "REC2", "REC3", "REC4"]);
        assert!(all.iter().all(|r| r.record.epoch_id == "-1" && !r.record.revoked));
    }

    #[test]
    fn test_create_then_query_round_trip() {
        let ledger = memory_ledger();
        let contract = ledger.contract();
        let api = contract.api();

        let cases = [("a", "0.1", "0.2", "1"), ("b", "", "", ""), ("c", "x", "y", "-1")];
        for (id, dm, dc, epoch) in cases {
            api.create_record(id, dm, dc, epoch).unwrap();
            let record = api.query_record(id).unwrap();
            assert_eq!(
                (record.dm_value.as_str(), record.dc_value.as_str(), record.epoch_id.as_str()),
                (dm, dc, epoch)
            );
            assert!(!record.revoked);
        }

        assert!(matches!(
            api.query_record("never-written"),
            Err(LifecycleError::NotExists { .. })
        ));
    }

    #[test]
    fn test_revoke_idempotent_and_missing_leaves_store_unchanged() {
        let ledger = memory_ledger();
        let contract = ledger.contract();
        let api = contract.api();
        api.create_record("r1", "0.5", "0.1", "7").unwrap();

        api.revoke_gradients("r1").unwrap();
        api.revoke_gradients("r1").unwrap();
        assert!(api.query_record("r1").unwrap().revoked);

        let before = scan(ledger.store().as_ref());
        let err = api.revoke_gradients("ghost").unwrap_err();
        assert_eq!(
            err,
            LifecycleError::NotExists {
                record_id: "ghost".into()
            }
        );
        assert_eq!(scan(ledger.store().as_ref()), before);

        // Re-creating a revoked id keeps it revoked.
        api.create_record("r1", "0.9", "0.9", "7").unwrap();
        let record = api.query_record("r1").unwrap();
        assert!(record.revoked);
        assert_eq!(record.dm_value, "0.9");
    }

    #[test]
    fn test_epoch_query_matches_exact_set() {
        let ledger = memory_ledger();
        let contract = ledger.contract();
        let api = contract.api();

        // Interleaved insertion order.
        let epochs = ["2", "1", "2", "10", "2", "1"];
        for (i, epoch) in epochs.iter().enumerate() {
            api.create_record(&format!("k{i}"), "a", "b", epoch).unwrap();
        }

        let keys = |e: &str| -> BTreeSet<String> {
            api.query_records_by_epoch(e)
                .unwrap()
                .into_iter()
                .map(|r| r.key)
                .collect()
        };
        assert_eq!(keys("2"), BTreeSet::from(["k0".into(), "k2".into(), "k4".into()]));
        assert_eq!(keys("1"), BTreeSet::from(["k1".into(), "k5".into()]));
        assert_eq!(keys("10"), BTreeSet::from(["k3".into()]));
        assert!(keys("3").is_empty());
    }

    #[test]
    fn test_write_log_covers_every_write() {
        let ledger = memory_ledger();
        ledger.seed_if_empty().unwrap();
        let contract = ledger.contract();
        contract.api().revoke_gradients("REC0").unwrap();

        let store = ledger.store();
        store.verify_write_log().unwrap();
        let history = store.history("REC0").unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[0].sequence < history[1].sequence);
        assert_ne!(history[1].prev_hash, gl_01_record_store::GENESIS_HASH);
        assert_eq!(store.open_cursors(), 0);
    }
}
