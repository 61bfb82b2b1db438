//! Bank implementation benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use flashtx_bank::{FileBank, FlashBank, MemoryBank};
use flashtx_bench::patterned_data;
use tempfile::TempDir;

/// Benchmark MemoryBank program operations.
fn bench_memory_program(c: &mut Criterion) {
    let mut group = c.benchmark_group("memory_program");

    for size in [16, 64, 256, 1024].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let mut bank: MemoryBank = MemoryBank::new(4096);
            let data = patterned_data(size);

            b.iter(|| {
                bank.write_chunk(black_box(0), black_box(&data)).unwrap();
            });
        });
    }

    group.finish();
}

/// Benchmark MemoryBank read operations.
fn bench_memory_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("memory_read");

    for size in [16, 64, 256, 1024].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let mut bank: MemoryBank = MemoryBank::new(4096);
            let data = patterned_data(size);
            bank.write_chunk(0, &data).unwrap();

            let mut buf = vec![0u8; size];
            b.iter(|| {
                bank.read_chunk(black_box(0), black_box(&mut buf)).unwrap();
            });
        });
    }

    group.finish();
}

/// Benchmark FileBank program operations (each program syncs).
fn bench_file_program(c: &mut Criterion) {
    let mut group = c.benchmark_group("file_program");
    group.sample_size(20);

    for size in [64, 256, 1024].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let temp_dir = TempDir::new().unwrap();
            let path = temp_dir.path().join("bank.bin");
            let mut bank: FileBank = FileBank::open(&path, 4096).unwrap();
            let data = patterned_data(size);

            b.iter(|| {
                bank.write_chunk(black_box(0), black_box(&data)).unwrap();
            });
        });
    }

    group.finish();
}

/// Benchmark whole-bank erase.
fn bench_erase(c: &mut Criterion) {
    let mut group = c.benchmark_group("erase");

    group.bench_function("memory_4096", |b| {
        let mut bank: MemoryBank = MemoryBank::new(4096);
        b.iter(|| bank.erase().unwrap());
    });

    group.sample_size(20);
    group.bench_function("file_4096", |b| {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bank.bin");
        let mut bank: FileBank = FileBank::open(&path, 4096).unwrap();
        b.iter(|| bank.erase().unwrap());
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_memory_program,
    bench_memory_read,
    bench_file_program,
    bench_erase,
);

criterion_main!(benches);
