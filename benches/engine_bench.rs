use std::sync::Arc;

use biomatch::{
    EngineConfig, Fingerprint, ImageKind, MatchEngine, Record, RecordStore, SearchStrategy,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use serde_json::json;

fn sample_record(i: u64) -> Record {
    let bits = (i << 56) | (i.wrapping_mul(0x9E37_79B9_7F4A_7C15) & 0x00FF_FFFF_FFFF_FFFF);
    Record::new(json!({"seq": i})).with_face(Fingerprint::from_raw(bits))
}

fn seeded_store(count: u64) -> Arc<RecordStore> {
    let store = RecordStore::in_memory();
    let records = (0..count).map(sample_record).collect();
    store.batch_insert(records).expect("seed");
    Arc::new(store)
}

fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine");

    let store = seeded_store(1);
    group.bench_function("insert_single", |b| {
        let rec = sample_record(1);
        b.iter(|| store.insert(black_box(rec.clone())).expect("insert"))
    });

    for size in [100u64, 1_000, 10_000] {
        let store = seeded_store(size);
        let bucketed = MatchEngine::new(store.clone(), EngineConfig::default()).expect("engine");
        let full_scan = MatchEngine::new(
            store,
            EngineConfig::default().with_strategy(SearchStrategy::FullScan),
        )
        .expect("engine");
        let query = Fingerprint::from_raw((42 << 56) | 0xABCD);

        group.throughput(Throughput::Elements(size));
        group.bench_function(format!("bucketed_{size}"), |b| {
            b.iter(|| bucketed.search_fingerprint(black_box(&query), ImageKind::Face))
        });
        group.bench_function(format!("full_scan_{size}"), |b| {
            b.iter(|| full_scan.search_fingerprint(black_box(&query), ImageKind::Face))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_engine);
criterion_main!(benches);
