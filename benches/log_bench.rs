//! Benchmarks for riftlog log operations

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use riftlog::{Config, Log, Record};
use tempfile::TempDir;

fn bench_config() -> Config {
    Config::builder()
        .max_store_bytes(64 * 1024 * 1024)
        .max_index_bytes(8 * 1024 * 1024)
        .build()
}

fn append_benchmark(c: &mut Criterion) {
    let temp_dir = TempDir::new().unwrap();
    let log = Log::open(temp_dir.path(), bench_config()).unwrap();
    let value = vec![0xABu8; 100];

    c.bench_function("append_100b", |b| {
        b.iter_batched(
            || Record::new(value.clone()),
            |mut record| log.append(&mut record).unwrap(),
            BatchSize::SmallInput,
        )
    });
}

fn read_benchmark(c: &mut Criterion) {
    let temp_dir = TempDir::new().unwrap();
    let log = Log::open(temp_dir.path(), bench_config()).unwrap();

    let count: u64 = 10_000;
    for _ in 0..count {
        log.append(&mut Record::new(vec![0xCDu8; 100])).unwrap();
    }

    let mut offset = 0;
    c.bench_function("read_100b", |b| {
        b.iter(|| {
            let record = log.read(offset).unwrap();
            offset = (offset + 1) % count;
            record
        })
    });
}

criterion_group!(benches, append_benchmark, read_benchmark);
criterion_main!(benches);
