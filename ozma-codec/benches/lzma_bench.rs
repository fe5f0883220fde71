//! Benchmarks for the LZMA1 encoder and decoder.

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use ozma_codec::{Algo, LzmaParams, MatchMode, compress, decompress_bytes};
use std::hint::black_box;

/// Deterministic pseudo-random bytes.
fn random_bytes(n: usize) -> Vec<u8> {
    let mut state = 0x9E3779B97F4A7C15u64;
    (0..n)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 56) as u8
        })
        .collect()
}

fn text_corpus(n: usize) -> Vec<u8> {
    let sentence = b"The quick brown fox jumps over the lazy dog. Pack my box with five dozen liquor jugs. ";
    sentence.iter().cycle().take(n).copied().collect()
}

fn bench_compress(c: &mut Criterion) {
    let size = 256 * 1024;
    let corpora: [(&str, Vec<u8>); 3] = [
        ("text", text_corpus(size)),
        ("random", random_bytes(size)),
        ("zeros", vec![0u8; size]),
    ];

    let mut group = c.benchmark_group("compress");
    group.throughput(Throughput::Bytes(size as u64));
    for (name, data) in &corpora {
        group.bench_function(format!("normal/{name}"), |b| {
            b.iter(|| compress(black_box(data), LzmaParams::default()).unwrap())
        });

        let mut fast = LzmaParams::default();
        fast.mode = MatchMode::HashChain;
        fast.algo = Algo::Fast;
        group.bench_function(format!("fast/{name}"), |b| {
            b.iter(|| compress(black_box(data), fast).unwrap())
        });
    }
    group.finish();
}

fn bench_decompress(c: &mut Criterion) {
    let size = 256 * 1024;
    let data = text_corpus(size);
    let packed = compress(&data, LzmaParams::default()).unwrap();

    let mut group = c.benchmark_group("decompress");
    group.throughput(Throughput::Bytes(size as u64));
    group.bench_function("text", |b| {
        b.iter(|| decompress_bytes(black_box(&packed)).unwrap())
    });
    group.finish();
}

criterion_group!(benches, bench_compress, bench_decompress);
criterion_main!(benches);
