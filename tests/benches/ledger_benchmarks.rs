//! # Gradient Ledger Benchmarks
//!
//! | Path | Operation |
//! |------|-----------|
//! | gl-01 | `put` into the in-memory world state |
//! | gl-01 | epoch query, indexed vs full scan |
//! | gl-03 | epoch reduction |
//! | gl-03 | full `SendDcDm` through the in-process contract |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::time::Duration;

use gl_01_record_store::{InMemoryLedger, LedgerStore, Selector, StoreConfig};
use gl_02_record_lifecycle::{encode_record, GradientRecord, QueryResult};
use gl_03_aggregation_gateway::{aggregate, DcDmRequest, GatewayConfig, RevokedPolicy};
use gl_tests::fixtures::{memory_ledger, service_for};

// ============================================================================
// GL-01: Record Store
// ============================================================================

fn populated(config: StoreConfig, records: usize, epochs: usize) -> InMemoryLedger {
    let store = InMemoryLedger::new(config);
    for i in 0..records {
        let record = GradientRecord::new(i.to_string(), "0.1", (i % epochs).to_string());
        let bytes = match encode_record(&record) {
            Ok(bytes) => bytes,
            Err(e) => panic!("encode failed: {e}"),
        };
        if let Err(e) = store.put(&format!("rec-{i:06}"), &bytes) {
            panic!("put failed: {e}");
        }
    }
    store
}

fn bench_store_put(c: &mut Criterion) {
    let mut group = c.benchmark_group("gl-01-record-store");
    group.measurement_time(Duration::from_secs(5));

    let store = InMemoryLedger::new(StoreConfig::default());
    let value = br#"{"dmvalue":"0.5","dcvalue":"0.1","epochid":"7"}"#;
    let mut i = 0u64;
    group.bench_function("put", |b| {
        b.iter(|| {
            i += 1;
            black_box(store.put(&format!("k{i}"), value).is_ok())
        })
    });
    group.finish();
}

fn bench_epoch_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("gl-01-epoch-query");
    let selector = Selector::eq("epochid", "3");

    for size in [1_000usize, 10_000] {
        let indexed = populated(StoreConfig::default(), size, 100);
        let scanned = populated(StoreConfig::unindexed(), size, 100);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("indexed", size), &size, |b, _| {
            b.iter(|| black_box(indexed.query_by_predicate(&selector).map(|it| it.count())))
        });
        group.bench_with_input(BenchmarkId::new("full_scan", size), &size, |b, _| {
            b.iter(|| black_box(scanned.query_by_predicate(&selector).map(|it| it.count())))
        });
    }
    group.finish();
}

// ============================================================================
// GL-03: Aggregation
// ============================================================================

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("gl-03-aggregate");
    for size in [10usize, 1_000] {
        let results: Vec<QueryResult> = (0..size)
            .map(|i| QueryResult {
                key: format!("rec-{i}"),
                record: GradientRecord::new(format!("0.{i}"), format!("1.{i}"), "7"),
            })
            .collect();
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("join", size), &results, |b, results| {
            b.iter(|| black_box(aggregate(results, RevokedPolicy::Include, ", ")))
        });
    }
    group.finish();
}

fn bench_send_dc_dm(c: &mut Criterion) {
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => panic!("runtime: {e}"),
    };
    let ledger = memory_ledger();
    let svc = service_for(&ledger, &GatewayConfig::default());

    c.bench_function("gl-03-send-dc-dm", |b| {
        b.iter(|| {
            runtime.block_on(async {
                black_box(svc.send_dc_dm(DcDmRequest::new("0.5", "0.1", "7")).await.is_ok())
            })
        })
    });
}

criterion_group!(
    benches,
    bench_store_put,
    bench_epoch_query,
    bench_aggregate,
    bench_send_dc_dm
);
criterion_main!(benches);
