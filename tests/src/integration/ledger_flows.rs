//! # Ledger Flows
//!
//! Admission (qc-02) → mempool (qc-03) → sealing (qc-05) → events (shared-bus),
//! driven through the ledger facade (qc-06).
//!
//! ## Flows Tested
//!
//! 1. Signed transfer lifecycle and its event sequence
//! 2. Fees paid to the selected producer
//! 3. Mempool back-pressure and block size limits
//! 4. Async event stream fed by the producer task
//! 5. Snapshot restore with pending transactions
//! 6. Concurrent submitters against the live producer task
//! 7. Submissions racing `stop()`

#[cfg(test)]
mod tests {
    use super::super::{funded_config, TestLedger};
    use ed25519_dalek::{Signer, SigningKey};
    use futures::StreamExt;
    use qc_02_tx_validation::TransferRequest;
    use qc_03_mempool::MempoolConfig;
    use qc_06_ledger::{Ledger, LedgerConfig, LedgerError, LedgerSnapshot};
    use shared_bus::{EventFilter, EventTopic, InMemoryEventBus, LedgerEvent};
    use shared_types::{Address, Hash, Transaction, TxStatus};
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    fn kinds(events: &[LedgerEvent]) -> Vec<&'static str> {
        events.iter().map(LedgerEvent::kind).collect()
    }

    // =========================================================================
    // SIGNED TRANSFERS
    // =========================================================================

    #[test]
    fn test_signed_transfer_lifecycle() {
        let t = TestLedger::started(LedgerConfig {
            require_signatures: true,
            ..LedgerConfig::for_testing()
        });
        let alice = t.ledger.create_wallet().unwrap();
        let bob = t.wallet();
        let mut txs = t
            .ledger
            .subscribe(EventFilter::topics(vec![EventTopic::Transactions]));

        let unsigned = TransferRequest::simple(alice.address, bob, 40).with_nonce(0);
        assert!(matches!(
            t.ledger.submit_transaction(unsigned),
            Err(LedgerError::InvalidSignature)
        ));

        let seed: [u8; 32] = hex::decode(&alice.private_key)
            .unwrap()
            .try_into()
            .unwrap();
        let payload = Transaction::canonical_bytes(&alice.address, &bob, 40, 0, 1);
        let signature = SigningKey::from_bytes(&seed).sign(&payload);
        let request = TransferRequest {
            fee: 1,
            ..TransferRequest::simple(alice.address, bob, 40).with_nonce(0)
        }
        .with_signature(signature.to_bytes().to_vec());

        let tx = t.ledger.submit_transaction(request).unwrap();
        let block = t.tick(1).expect("pending transfer seals");
        assert_eq!(block.transactions.len(), 1);
        assert_eq!(block.transactions[0].hash, tx.hash);

        let events = txs.drain_ready();
        assert_eq!(
            kinds(&events),
            vec![
                "transaction_rejected",
                "transaction_admitted",
                "transaction_confirmed"
            ]
        );
        assert_eq!(
            t.ledger.get_transaction(&tx.hash).unwrap().status,
            TxStatus::Confirmed
        );
        assert_eq!(t.ledger.get_account(&alice.address).unwrap().balance, 959);
        assert_eq!(t.ledger.get_account(&bob).unwrap().balance, 1040);
    }

    // =========================================================================
    // STAKING AND FEES
    // =========================================================================

    #[test]
    fn test_fee_paid_to_only_validator() {
        let t = TestLedger::started(LedgerConfig::for_testing());
        let validator = t.wallet();
        let alice = t.wallet();
        let bob = t.wallet();

        t.ledger.register_validator(validator, 100).unwrap();
        t.ledger
            .submit_transaction(TransferRequest {
                fee: 5,
                ..TransferRequest::simple(alice, bob, 10)
            })
            .unwrap();

        let block = t.tick(1).unwrap();
        assert_eq!(block.header.producer, validator);
        assert_eq!(t.ledger.get_account(&validator).unwrap().balance, 905);
        assert_eq!(t.ledger.get_account(&alice).unwrap().balance, 985);
        assert_eq!(t.ledger.accounted_value(), t.ledger.get_stats().total_issued);
    }

    #[test]
    fn test_stake_cannot_spend_pending_debits() {
        let t = TestLedger::started(LedgerConfig::for_testing());
        let alice = t.wallet();
        let bob = t.wallet();

        t.ledger
            .submit_transaction(TransferRequest::simple(alice, bob, 950))
            .unwrap();
        assert!(matches!(
            t.ledger.register_validator(alice, 100),
            Err(LedgerError::InsufficientFunds { available: 50, .. })
        ));
        assert!(t.ledger.register_validator(alice, 50).is_ok());
    }

    // =========================================================================
    // BACK-PRESSURE
    // =========================================================================

    #[test]
    fn test_full_pool_drains_over_blocks() {
        let t = TestLedger::started(LedgerConfig::for_testing());
        let alice = t.wallet();
        let bob = t.wallet();

        for _ in 0..8 {
            t.ledger
                .submit_transaction(TransferRequest::simple(alice, bob, 1))
                .unwrap();
        }
        assert!(matches!(
            t.ledger.submit_transaction(TransferRequest::simple(alice, bob, 1)),
            Err(LedgerError::MempoolFull { capacity: 8 })
        ));

        let first = t.tick(1).unwrap();
        let second = t.tick(1).unwrap();
        assert_eq!(first.transactions.len(), 4);
        assert_eq!(second.transactions.len(), 4);

        let nonces: Vec<u64> = first
            .transactions
            .iter()
            .chain(&second.transactions)
            .map(|tx| tx.nonce)
            .collect();
        assert_eq!(nonces, (0..8).collect::<Vec<_>>());
        assert_eq!(t.ledger.get_account(&alice).unwrap().nonce, 8);
        assert!(t.tick(1).is_none());
    }

    // =========================================================================
    // EVENT STREAM
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_stream_follows_producer() {
        let t = TestLedger::new(LedgerConfig::for_testing());
        let alice = t.wallet();
        let bob = t.wallet();
        let mut blocks = t
            .ledger
            .event_stream(EventFilter::topics(vec![EventTopic::Blocks]));

        t.ledger.start().unwrap();
        t.ledger
            .submit_transaction(TransferRequest::simple(alice, bob, 7))
            .unwrap();

        let mut sealed = Vec::new();
        while sealed.len() < 2 {
            let event = tokio::time::timeout(Duration::from_secs(5), blocks.next())
                .await
                .expect("producer ticks")
                .expect("bus alive");
            if let LedgerEvent::BlockSealed(block) = event {
                sealed.push(block);
            }
        }

        assert!(sealed[0].is_genesis());
        assert_eq!(sealed[1].number(), 2);
        assert_eq!(sealed[1].transactions[0].amount, 7);
        t.ledger.stop();
    }

    // =========================================================================
    // SNAPSHOT RESTORE
    // =========================================================================

    #[test]
    fn test_restore_keeps_pending_transactions() {
        let alice = Address([0xA1; 20]);
        let bob = Address([0xB0; 20]);
        let t = TestLedger::started(funded_config(&[alice, bob], 500));
        t.ledger
            .submit_transaction(TransferRequest::simple(alice, bob, 120))
            .unwrap();
        t.ledger.stop();

        let bytes = bincode::serialize(&t.ledger.snapshot()).unwrap();
        let snapshot: LedgerSnapshot = bincode::deserialize(&bytes).unwrap();
        let restored = Arc::new(
            Ledger::restore(
                funded_config(&[alice, bob], 500),
                snapshot,
                t.clock.clone(),
                Arc::new(InMemoryEventBus::new()),
            )
            .unwrap(),
        );

        assert_eq!(restored.status().pending_transactions, 1);
        assert_eq!(restored.available_balance(&alice), 380);

        restored.start().unwrap();
        assert_eq!(restored.height(), 1);
        t.clock.advance(1);
        let block = restored.produce_block().unwrap();
        assert_eq!(block.transactions.len(), 1);
        assert_eq!(restored.get_account(&bob).unwrap().balance, 620);
        restored.verify_chain().unwrap();
    }

    #[test]
    fn test_contract_fee_conserves_value() {
        let t = TestLedger::started(LedgerConfig::for_testing());
        let deployer = t.wallet();

        let deployment = t
            .ledger
            .deploy_contract(deployer, &[0x60; 100], &[])
            .unwrap();
        assert_eq!(deployment.fee, 7);
        assert_eq!(t.ledger.get_account(&deployer).unwrap().balance, 993);
        assert_eq!(t.ledger.get_stats().total_contracts, 1);
        assert_eq!(t.ledger.accounted_value(), t.ledger.get_stats().total_issued);
    }

    // =========================================================================
    // CONCURRENCY
    // =========================================================================

    /// Fast real-time producer and a pool that never fills in these tests.
    fn concurrent_config() -> LedgerConfig {
        LedgerConfig {
            initial_balance: 1_000_000,
            block_interval_ms: 2,
            mempool: MempoolConfig {
                max_transactions: 1_000,
            },
            ..LedgerConfig::for_testing()
        }
    }

    /// Nonces of `sender` in chain order.
    fn sealed_nonces(ledger: &Ledger, sender: &Address) -> Vec<u64> {
        (1..=ledger.height())
            .flat_map(|n| ledger.get_block(n).unwrap().transactions.clone())
            .filter(|tx| tx.from == *sender)
            .map(|tx| tx.nonce)
            .collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_submitters_with_live_producer() {
        const PER_SENDER: u64 = 40;
        let t = TestLedger::new(concurrent_config());
        let senders: Vec<Address> = (0..4).map(|_| t.wallet()).collect();
        let sink = t.wallet();
        t.ledger.start().unwrap();

        let workers: Vec<_> = senders
            .iter()
            .map(|&from| {
                let ledger = Arc::clone(&t.ledger);
                tokio::task::spawn_blocking(move || {
                    for _ in 0..PER_SENDER {
                        ledger
                            .submit_transaction(TransferRequest::simple(from, sink, 3).with_fee(1))
                            .unwrap();
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.await.unwrap();
        }

        tokio::time::timeout(Duration::from_secs(10), async {
            while t.ledger.status().pending_transactions > 0 {
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
        })
        .await
        .expect("producer drains the pool");
        t.ledger.stop();

        for sender in &senders {
            assert_eq!(
                sealed_nonces(&t.ledger, sender),
                (0..PER_SENDER).collect::<Vec<_>>()
            );
            let account = t.ledger.get_account(sender).unwrap();
            assert_eq!(account.nonce, PER_SENDER);
            assert_eq!(account.balance, 1_000_000 - 4 * u128::from(PER_SENDER));
        }
        assert_eq!(
            t.ledger.get_account(&sink).unwrap().balance,
            1_000_000 + 12 * u128::from(PER_SENDER)
        );
        assert_eq!(t.ledger.accounted_value(), t.ledger.get_stats().total_issued);
        t.ledger.verify_chain().unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_submissions_racing_stop() {
        let t = TestLedger::new(concurrent_config());
        let senders: Vec<Address> = (0..4).map(|_| t.wallet()).collect();
        let sink = t.wallet();
        t.ledger.start().unwrap();

        let workers: Vec<_> = senders
            .iter()
            .map(|&from| {
                let ledger = Arc::clone(&t.ledger);
                tokio::task::spawn_blocking(move || {
                    let mut admitted = Vec::new();
                    loop {
                        match ledger.submit_transaction(TransferRequest::simple(from, sink, 1)) {
                            Ok(tx) => admitted.push(tx.hash),
                            Err(LedgerError::NodeNotRunning) => return admitted,
                            Err(LedgerError::MempoolFull { .. }) => std::thread::yield_now(),
                            Err(other) => panic!("unexpected rejection: {other}"),
                        }
                    }
                })
            })
            .collect();

        tokio::time::sleep(Duration::from_millis(20)).await;
        t.ledger.stop();
        let mut admitted: HashMap<Address, Vec<Hash>> = HashMap::new();
        for (sender, worker) in senders.iter().zip(workers) {
            admitted.insert(*sender, worker.await.unwrap());
        }

        let height = t.ledger.height();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(t.ledger.height(), height);
        assert_eq!(
            t.ledger.submit_transaction(TransferRequest::simple(sink, sink, 1)),
            Err(LedgerError::NodeNotRunning)
        );

        let mut sealed = 0;
        for (sender, hashes) in &admitted {
            let confirmed = sealed_nonces(&t.ledger, sender);
            assert_eq!(confirmed, (0..confirmed.len() as u64).collect::<Vec<_>>());

            for hash in hashes {
                let tx = t.ledger.get_transaction(hash).unwrap();
                match tx.status {
                    TxStatus::Pending => assert!(tx.nonce >= confirmed.len() as u64),
                    TxStatus::Confirmed => {
                        let block = t.ledger.get_block(tx.block_number.unwrap()).unwrap();
                        assert!(block.transactions.iter().any(|b| b.hash == tx.hash));
                    }
                    other => panic!("admitted transfer ended {other:?}"),
                }
            }

            let account = t.ledger.get_account(sender).unwrap();
            assert_eq!(account.nonce, confirmed.len() as u64);
            assert_eq!(account.next_nonce, hashes.len() as u64);
            sealed += confirmed.len();
        }

        let in_blocks: usize = (1..=height)
            .map(|n| t.ledger.get_block(n).unwrap().transactions.len())
            .sum();
        assert_eq!(in_blocks, sealed);
        assert_eq!(t.ledger.accounted_value(), t.ledger.get_stats().total_issued);
        t.ledger.verify_chain().unwrap();
    }
}
