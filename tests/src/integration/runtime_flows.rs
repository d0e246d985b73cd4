//! # Runtime Flows
//!
//! Boot, persist and reboot through the node runtime, including the
//! refusal to boot from a tampered snapshot.

#[cfg(test)]
mod tests {
    use node_runtime::{NodeConfig, NodeRuntime, SnapshotStore};
    use qc_02_tx_validation::TransferRequest;
    use shared_types::{Hash, ManualTimeSource};
    use std::path::Path;
    use std::sync::Arc;

    fn config(dir: &Path) -> NodeConfig {
        let mut config = NodeConfig::for_testing();
        config.storage.data_dir = Some(dir.to_path_buf());
        config.storage.min_free_bytes = 0;
        config
    }

    #[test]
    fn test_reboot_continues_chain() {
        let dir = tempfile::tempdir().unwrap();
        let clock = Arc::new(ManualTimeSource::new(0));

        let head = {
            let runtime = NodeRuntime::with_clock(config(dir.path()), clock.clone()).unwrap();
            let ledger = runtime.ledger();
            let alice = ledger.create_wallet().unwrap().address;
            let bob = ledger.create_wallet().unwrap().address;
            ledger.start().unwrap();
            ledger.register_validator(alice, 50).unwrap();
            ledger
                .submit_transaction(TransferRequest {
                    fee: 3,
                    ..TransferRequest::simple(bob, alice, 100)
                })
                .unwrap();
            clock.set(100);
            ledger.produce_block().unwrap();
            runtime.persist().unwrap();
            ledger.get_chain_head().unwrap().hash
        };

        let runtime = NodeRuntime::with_clock(config(dir.path()), clock.clone()).unwrap();
        let ledger = runtime.ledger();
        assert_eq!(ledger.get_chain_head().unwrap().hash, head);
        assert_eq!(ledger.list_validators().len(), 1);

        let stats = ledger.get_stats();
        assert_eq!(stats.total_wallets, 2);
        assert_eq!(stats.total_stake, 50);
        assert_eq!(ledger.accounted_value(), stats.total_issued);

        ledger.start().unwrap();
        clock.set(5_000);
        let next = ledger.produce_block().expect("heartbeat block");
        assert_eq!(next.number(), 3);
        assert_eq!(next.previous_hash(), head);
    }

    #[test]
    fn test_tampered_snapshot_refuses_boot() {
        let dir = tempfile::tempdir().unwrap();
        let clock = Arc::new(ManualTimeSource::new(0));
        {
            let runtime = NodeRuntime::with_clock(config(dir.path()), clock.clone()).unwrap();
            let ledger = runtime.ledger();
            let alice = ledger.create_wallet().unwrap().address;
            let bob = ledger.create_wallet().unwrap().address;
            ledger.start().unwrap();
            ledger
                .submit_transaction(TransferRequest::simple(alice, bob, 10))
                .unwrap();
            clock.set(10);
            ledger.produce_block().unwrap();
            runtime.persist().unwrap();
        }

        {
            let store = SnapshotStore::open(dir.path(), 0).unwrap();
            let mut snapshot = store.load().unwrap().unwrap();
            snapshot.blocks[1].header.previous_hash = Hash([9; 32]);
            store.save(&snapshot).unwrap();
        }

        let err = NodeRuntime::with_clock(config(dir.path()), clock)
            .err()
            .expect("tampered chain rejected");
        assert!(format!("{err:#}").contains("failed verification"));
    }
}
