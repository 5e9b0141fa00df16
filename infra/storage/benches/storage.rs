use bns_storage::FileStore;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use std::time::Duration;
use tempfile::TempDir;

// ============================================================================
// Benchmark: Key Resolution & Sandbox Validation
// ============================================================================

fn bench_key_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("key_resolution");

    let temp = TempDir::new().unwrap();
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = rt.block_on(async {
        FileStore::builder().root(temp.path()).extension("json").open().await.unwrap()
    });

    group.bench_function("short_key", |b| {
        b.iter(|| black_box(store.path_for("log").unwrap()));
    });

    group.bench_function("long_key", |b| {
        let key = "k".repeat(120);
        b.iter(|| black_box(store.path_for(key.as_str()).unwrap()));
    });

    group.finish();
}

// ============================================================================
// Benchmark: Atomic Writes & Reads
// ============================================================================

fn bench_file_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("file_operations");
    group.measurement_time(Duration::from_secs(10));

    let temp = TempDir::new().unwrap();
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = rt.block_on(async {
        FileStore::builder().root(temp.path()).extension("json").open().await.unwrap()
    });

    // A full 50-entry notification log is roughly 10KB of JSON.
    let sizes = [("1KB", 1024), ("10KB", 10 * 1024), ("100KB", 100 * 1024)];

    for (name, size) in sizes {
        let data = vec![b'x'; size];
        group.throughput(Throughput::Bytes(u64::try_from(size).unwrap_or(u64::MAX)));

        group.bench_with_input(BenchmarkId::new("write", name), &data, |b, data| {
            b.to_async(&rt).iter(|| async {
                store.write(format!("write_{name}"), data).await.unwrap();
            });
        });

        rt.block_on(async { store.write(format!("read_{name}"), &data).await.unwrap() });

        group.bench_function(BenchmarkId::new("read", name), |b| {
            b.to_async(&rt).iter(|| async {
                black_box(store.read(format!("read_{name}")).await.unwrap());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_key_resolution, bench_file_operations);

criterion_main!(benches);
