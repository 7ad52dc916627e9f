use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use utf8_lanes::bench::{detect_available_paths, validate_with_path};
use utf8_lanes::harness::RandomSample;

fn ascii(size: usize) -> Vec<u8> {
    (0..size).map(|i| b' ' + (i % 95) as u8).collect()
}

fn mixed(size: usize) -> Vec<u8> {
    let mut text = "Ünïcödé text, 日本語, \u{1F980} and plain words. ".repeat(size / 40 + 1).into_bytes();
    // cut back to a character boundary
    text.truncate(size);
    while std::str::from_utf8(&text).is_err() {
        text.pop();
    }
    text
}

fn bench_paths(c: &mut Criterion, name: &str, make: fn(usize) -> Vec<u8>) {
    let mut group = c.benchmark_group(name);

    for size in [64, 1024, 16384, 262144] {
        let data = make(size);
        group.throughput(Throughput::Bytes(data.len() as u64));

        for path in detect_available_paths() {
            group.bench_with_input(BenchmarkId::new(path.to_string(), size), &data, |b, data| {
                b.iter(|| validate_with_path(black_box(data), path));
            });
        }
    }

    group.finish();
}

fn bench_ascii(c: &mut Criterion) {
    bench_paths(c, "validate_ascii", ascii);
}

fn bench_mixed(c: &mut Criterion) {
    bench_paths(c, "validate_mixed", mixed);
}

fn bench_random_sample(c: &mut Criterion) {
    let sample = RandomSample::generate(7, 20000, 20000, true);
    let mut group = c.benchmark_group("validate_random");
    group.throughput(Throughput::Bytes(sample.bytes.len() as u64));

    for path in detect_available_paths() {
        group.bench_function(path.to_string(), |b| {
            b.iter(|| validate_with_path(black_box(&sample.bytes), path));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_ascii, bench_mixed, bench_random_sample);
criterion_main!(benches);
