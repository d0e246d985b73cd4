//! # Ledger Properties
//!
//! Random workloads of transfers, staking, deployments and clock ticks
//! against a ledger on a manual clock. After every workload:
//!
//! | Property | Check |
//! |----------|-------|
//! | Conservation | balances + active stake == total issued |
//! | Nonce contiguity | each sender's sealed nonces run 0, 1, 2, ... |
//! | Chain integrity | numbers are dense, links and hashes verify |
//! | Pending bound | available balance never exceeds balance |
//! | Determinism | the same workload yields the same snapshot |
//! | Rejection is inert | a refused request changes nothing |

#[cfg(test)]
mod tests {
    use super::super::{funded_config, TestLedger};
    use proptest::prelude::*;
    use qc_02_tx_validation::TransferRequest;
    use qc_06_ledger::LedgerError;
    use shared_types::{Address, Amount, Nonce};
    use std::collections::HashMap;

    const WALLETS: usize = 4;

    fn wallet(index: usize) -> Address {
        Address([0x10 + index as u8; 20])
    }

    fn wallets() -> Vec<Address> {
        (0..WALLETS).map(wallet).collect()
    }

    #[derive(Debug, Clone)]
    enum Op {
        Transfer {
            from: usize,
            to: usize,
            amount: Amount,
            fee: Amount,
        },
        Stake {
            who: usize,
            stake: Amount,
        },
        Unstake {
            who: usize,
        },
        Deploy {
            who: usize,
            code_len: usize,
        },
        Tick {
            advance_ms: u64,
        },
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            5 => (0..WALLETS, 0..WALLETS, 1u128..400, 0u128..5)
                .prop_map(|(from, to, amount, fee)| Op::Transfer { from, to, amount, fee }),
            1 => (0..WALLETS, 20u128..200).prop_map(|(who, stake)| Op::Stake { who, stake }),
            1 => (0..WALLETS).prop_map(|who| Op::Unstake { who }),
            1 => (0..WALLETS, 1usize..300).prop_map(|(who, code_len)| Op::Deploy { who, code_len }),
            3 => (0u64..1_500).prop_map(|advance_ms| Op::Tick { advance_ms }),
        ]
    }

    fn run(ops: &[Op]) -> TestLedger {
        let t = TestLedger::started(funded_config(&wallets(), 1_000));
        for op in ops {
            apply(&t, op);
        }
        t
    }

    fn apply(t: &TestLedger, op: &Op) {
        // Refusals are part of the workload.
        match *op {
            Op::Transfer {
                from,
                to,
                amount,
                fee,
            } => {
                let _ = t.ledger.submit_transaction(TransferRequest {
                    fee,
                    ..TransferRequest::simple(wallet(from), wallet(to), amount)
                });
            }
            Op::Stake { who, stake } => {
                let _ = t.ledger.register_validator(wallet(who), stake);
            }
            Op::Unstake { who } => {
                let _ = t.ledger.unstake_validator(&wallet(who));
            }
            Op::Deploy { who, code_len } => {
                let _ = t.ledger.deploy_contract(wallet(who), &vec![0xFE; code_len], &[]);
            }
            Op::Tick { advance_ms } => {
                t.tick(advance_ms);
            }
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_value_is_conserved(ops in prop::collection::vec(op(), 1..60)) {
            let t = TestLedger::started(funded_config(&wallets(), 1_000));
            for op in &ops {
                apply(&t, op);
                prop_assert_eq!(t.ledger.accounted_value(), t.ledger.get_stats().total_issued);
            }
        }

        #[test]
        fn prop_sealed_nonces_are_contiguous(ops in prop::collection::vec(op(), 1..60)) {
            let t = run(&ops);
            t.tick(10_000);

            let mut chain = t.ledger.recent_blocks(usize::MAX);
            chain.reverse();
            let mut next: HashMap<Address, Nonce> = HashMap::new();
            for block in &chain {
                for tx in &block.transactions {
                    let expected = next.entry(tx.from).or_insert(0);
                    prop_assert_eq!(tx.nonce, *expected);
                    *expected += 1;
                }
            }
            for address in wallets() {
                let account = t.ledger.get_account(&address).unwrap();
                prop_assert_eq!(account.nonce, next.get(&address).copied().unwrap_or(0));
            }
        }

        #[test]
        fn prop_chain_verifies(ops in prop::collection::vec(op(), 1..60)) {
            let t = run(&ops);
            prop_assert!(t.ledger.verify_chain().is_ok());

            let mut chain = t.ledger.recent_blocks(usize::MAX);
            chain.reverse();
            prop_assert_eq!(chain.len() as u64, t.ledger.height());
            for (index, pair) in chain.windows(2).enumerate() {
                prop_assert_eq!(pair[1].number(), index as u64 + 2);
                prop_assert_eq!(pair[1].previous_hash(), pair[0].hash);
                prop_assert!(pair[1].timestamp() >= pair[0].timestamp());
            }
        }

        #[test]
        fn prop_available_never_exceeds_balance(ops in prop::collection::vec(op(), 1..60)) {
            let t = run(&ops);
            for address in wallets() {
                let account = t.ledger.get_account(&address).unwrap();
                prop_assert!(account.available_balance <= account.balance);
            }
        }

        #[test]
        fn prop_same_workload_same_ledger(ops in prop::collection::vec(op(), 1..40)) {
            let a = run(&ops);
            let b = run(&ops);
            prop_assert_eq!(a.ledger.snapshot(), b.ledger.snapshot());
        }

        #[test]
        fn prop_rejection_changes_nothing(
            ops in prop::collection::vec(op(), 0..30),
            who in 0..WALLETS,
            skip in 1u64..5,
        ) {
            let t = run(&ops);
            let sender = wallet(who);
            let expected = t.ledger.get_account(&sender).unwrap().next_nonce;
            let request = TransferRequest::simple(sender, wallet((who + 1) % WALLETS), 1)
                .with_nonce(expected + skip);

            let before = t.ledger.snapshot();
            let first = t.ledger.submit_transaction(request.clone()).unwrap_err();
            let second = t.ledger.submit_transaction(request).unwrap_err();

            prop_assert_eq!(&first, &second);
            let is_nonce_mismatch = matches!(first, LedgerError::NonceMismatch { .. });
            let is_insufficient = matches!(first, LedgerError::InsufficientFunds { .. });
            prop_assert!(is_nonce_mismatch || is_insufficient);
            prop_assert_eq!(t.ledger.snapshot(), before);
        }
    }
}
