//! # Quantum-Chain Ledger Benchmarks
//!
//! | Path | Measures |
//! |------|----------|
//! | qc-06 admission | `submit_transaction` into an empty pool |
//! | qc-05 sealing | one tick draining a full block |
//! | qc-06 verification | `verify_chain` over N blocks |
//! | node-runtime snapshot | bincode encoding of the ledger snapshot |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use qc_02_tx_validation::TransferRequest;
use qc_03_mempool::MempoolConfig;
use qc_05_block_assembly::AssemblyConfig;
use qc_06_ledger::{GenesisAllocation, Ledger, LedgerConfig};
use shared_bus::InMemoryEventBus;
use shared_types::{Address, ManualTimeSource};
use std::sync::Arc;

const SENDER: Address = Address([0x11; 20]);
const RECEIVER: Address = Address([0x22; 20]);

fn ledger(block_size: usize) -> (Arc<ManualTimeSource>, Arc<Ledger>) {
    let config = LedgerConfig {
        genesis_allocations: vec![GenesisAllocation {
            address: SENDER,
            amount: u64::MAX as u128,
        }],
        mempool: MempoolConfig {
            max_transactions: block_size.max(1) * 2,
        },
        assembly: AssemblyConfig {
            max_transactions_per_block: block_size.max(1),
            ..AssemblyConfig::for_testing()
        },
        ..LedgerConfig::for_testing()
    };
    let clock = Arc::new(ManualTimeSource::new(0));
    let ledger = Arc::new(
        Ledger::with_parts(config, clock.clone(), Arc::new(InMemoryEventBus::new()))
            .expect("valid config"),
    );
    ledger.start().expect("fresh ledger");
    (clock, ledger)
}

fn fill(ledger: &Ledger, count: usize) {
    for _ in 0..count {
        ledger
            .submit_transaction(TransferRequest::simple(SENDER, RECEIVER, 1))
            .expect("admitted");
    }
}

fn bench_admission(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-06-admission");
    group.throughput(Throughput::Elements(1));
    group.bench_function("submit_transaction", |b| {
        b.iter_batched(
            || ledger(1).1,
            |ledger| {
                black_box(
                    ledger
                        .submit_transaction(TransferRequest::simple(SENDER, RECEIVER, 1))
                        .is_ok(),
                )
            },
            criterion::BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_sealing(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-05-sealing");
    for size in [10usize, 100, 500] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("seal_full_block", size), &size, |b, &size| {
            b.iter_batched(
                || {
                    let (clock, ledger) = ledger(size);
                    fill(&ledger, size);
                    clock.advance(1);
                    ledger
                },
                |ledger| black_box(ledger.produce_block()),
                criterion::BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

fn bench_verification(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-06-verification");
    for blocks in [10usize, 100] {
        let (clock, ledger) = ledger(10);
        for _ in 0..blocks {
            fill(&ledger, 10);
            clock.advance(1);
            ledger.produce_block();
        }
        group.bench_with_input(BenchmarkId::new("verify_chain", blocks), &ledger, |b, ledger| {
            b.iter(|| black_box(ledger.verify_chain().is_ok()))
        });
        group.bench_with_input(BenchmarkId::new("snapshot_encode", blocks), &ledger, |b, ledger| {
            b.iter(|| black_box(bincode::serialize(&ledger.snapshot()).map(|bytes| bytes.len())))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_admission, bench_sealing, bench_verification);
criterion_main!(benches);
