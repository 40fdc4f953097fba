//! Criterion micro-benchmarks for ledger and table operations.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use carbontrace_core::Cell;
use carbontrace_ledger::{CompactedSourceTable, Source, SourceCollection, SourceLedger};

/// A 100x100 ledger where every cell holds `per_cell` attributions with
/// amounts spread across the trim threshold.
fn populated_ledger(per_cell: u32) -> SourceLedger {
    let mut ledger = SourceLedger::new(100, 100);
    let mut entries = Vec::with_capacity(per_cell as usize);
    for y in 0..100u32 {
        for x in 0..100u32 {
            entries.clear();
            for k in 0..per_cell {
                let origin = Cell::new((x + k) % 100, y);
                let amount = if k % 3 == 0 { 0.00005 } else { 0.5 / f64::from(k + 1) };
                entries.push(Source::new(origin, amount));
            }
            ledger.push_cell(Cell::new(x, y), &entries).unwrap();
        }
    }
    ledger
}

/// Benchmark: trim a 10K-cell ledger holding 160K entries.
fn bench_trim_10k(c: &mut Criterion) {
    let ledger = populated_ledger(16);

    c.bench_function("ledger_trim_10k", |b| {
        b.iter_batched(
            || ledger.clone(),
            |mut l| {
                let t = l.trim(0.0001);
                black_box(t);
            },
            criterion::BatchSize::LargeInput,
        );
    });
}

/// Benchmark: compact a 10K-cell ledger into a flat table.
fn bench_compact_10k(c: &mut Criterion) {
    let ledger = populated_ledger(16);

    c.bench_function("table_compact_10k", |b| {
        b.iter(|| {
            let table = CompactedSourceTable::from_ledger(&ledger).unwrap();
            black_box(&table);
        });
    });
}

/// Benchmark: merge five scaled contributions into one accumulator, the
/// per-destination gather of a routing step.
fn bench_gather_five(c: &mut Criterion) {
    let contributions: Vec<Vec<Source>> = (0..5u32)
        .map(|i| {
            (0..24u32)
                .map(|k| Source::new(Cell::new(k + i, k), 1.0 / 24.0))
                .collect()
        })
        .collect();
    let mut acc = SourceCollection::with_capacity(64);

    c.bench_function("gather_five_contributions", |b| {
        b.iter(|| {
            acc.assign_scaled(&contributions[0], 0.2);
            for sources in &contributions[1..] {
                acc.add_scaled(sources, 0.2);
            }
            black_box(acc.len());
        });
    });
}

criterion_group!(benches, bench_trim_10k, bench_compact_10k, bench_gather_five);
criterion_main!(benches);
