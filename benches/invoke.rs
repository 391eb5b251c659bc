/*! Benchmarks for diff/patch over synthetic buffers.

Mirrors the regular/pathological/random sample categories the prior art
benchmarked against a checked-in `assets/` corpus, but generates its samples
in-memory instead: this workspace carries no fixture files or external
compatibility binary, so there is nothing for an `assets/` dir to hold.
*/

use bsdelta::{diff, patch};
use criterion::{criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time;

struct Sample {
    name: &'static str,
    old: Vec<u8>,
    new: Vec<u8>,
}

fn regular_samples() -> Vec<Sample> {
    let mut rng = StdRng::seed_from_u64(0x8E57);
    let mut samples = Vec::new();
    for &(name, len, mutations) in &[
        ("text-small", 4 * 1024, 32),
        ("text-medium", 256 * 1024, 512),
        ("text-large", 2 * 1024 * 1024, 4096),
    ] {
        let old: Vec<u8> = (0..len).map(|_| rng.gen_range(b'a'..=b'z')).collect();
        let mut new = old.clone();
        for _ in 0..mutations {
            let i = rng.gen_range(0..new.len());
            new[i] = rng.gen_range(b'a'..=b'z');
        }
        samples.push(Sample { name, old, new });
    }
    samples
}

fn pathological_samples() -> Vec<Sample> {
    // Long near-periodic runs are what the differ's livelock guard (spec
    // §4.6) exists to escape; benchmark it explicitly rather than only
    // relying on the round-trip tests to exercise it.
    let old = vec![b'a'; 512 * 1024];
    let mut new = old.clone();
    for (i, b) in new.iter_mut().enumerate() {
        if i % 97 == 0 {
            *b = b'b';
        }
    }
    vec![Sample {
        name: "near-periodic",
        old,
        new,
    }]
}

fn random_samples() -> Vec<Sample> {
    let mut rng = StdRng::seed_from_u64(0xDEADBEEF);
    let mut samples = Vec::new();
    for &(name, len) in &[("random-small", 8 * 1024), ("random-medium", 256 * 1024)] {
        let old: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
        let new: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
        samples.push(Sample { name, old, new });
    }
    samples
}

fn all_samples() -> Vec<Sample> {
    let mut samples = regular_samples();
    samples.extend(pathological_samples());
    samples.extend(random_samples());
    samples
}

pub fn bench_diff(crit: &mut Criterion) {
    for sample in all_samples() {
        let bench_name = format!("diff {}", sample.name);
        crit.bench_function(&bench_name, |b| {
            b.iter(|| diff(&sample.old, &sample.new).unwrap())
        });
    }
}

pub fn bench_patch(crit: &mut Criterion) {
    for sample in all_samples() {
        let bench_name = format!("patch {}", sample.name);
        let p = diff(&sample.old, &sample.new).unwrap();
        crit.bench_function(&bench_name, |b| {
            b.iter(|| patch(&sample.old, &p).unwrap())
        });
    }
}

criterion_group! {
    name = diff_benches;
    config = Criterion::default()
        .sample_size(10)
        .noise_threshold(0.02)
        .warm_up_time(time::Duration::from_millis(500))
        .measurement_time(time::Duration::new(10, 0));
    targets = bench_diff,
}

criterion_group! {
    name = patch_benches;
    config = Criterion::default()
        .sample_size(10)
        .noise_threshold(0.02)
        .warm_up_time(time::Duration::from_millis(200))
        .measurement_time(time::Duration::new(2, 0));
    targets = bench_patch,
}

criterion_main!(diff_benches, patch_benches);
