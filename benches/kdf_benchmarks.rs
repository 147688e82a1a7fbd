//! Hashing and key derivation throughput.
//!
//! The PBKDF2 group is what bounds login latency: one derivation per login
//! attempt at the configured iteration count.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use credential_core::crypto::{derive_password_hash, hash, hmac_sha256};

fn bench_sha256(c: &mut Criterion) {
    let mut group = c.benchmark_group("sha256");
    for size in [64usize, 4096, 1 << 20] {
        let data = vec![0xabu8; size];
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_function(format!("{size}_bytes"), |b| b.iter(|| hash(black_box(&data))));
    }
    group.finish();
}

fn bench_hmac(c: &mut Criterion) {
    let key = [0x0bu8; 32];
    let message = [0xcdu8; 256];
    c.bench_function("hmac_sha256_256_bytes", |b| {
        b.iter(|| hmac_sha256(black_box(&key), black_box(&message)))
    });
}

fn bench_pbkdf2(c: &mut Criterion) {
    let mut group = c.benchmark_group("pbkdf2_password_hash");
    group.sample_size(10);
    let salt = [7u8; 16];
    for iterations in [1_000u32, 100_000] {
        group.bench_function(format!("{iterations}_iterations"), |b| {
            b.iter(|| derive_password_hash(black_box(b"correct horse"), &salt, iterations))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_sha256, bench_hmac, bench_pbkdf2);
criterion_main!(benches);
