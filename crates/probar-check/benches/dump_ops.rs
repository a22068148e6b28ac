//! Dump and Diff Benchmarks
//!
//! Benchmarks for value reflection, dump rendering and unified diffs.
//!
//! Run with: `cargo bench --bench dump_ops`

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use probar_check::prelude::*;
use probar_check::{reflect, unified};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Serialize)]
struct Player {
    name: String,
    score: u32,
    tags: Vec<&'static str>,
}

fn players(n: usize) -> Vec<Player> {
    (0..n)
        .map(|i| Player {
            name: format!("player-{i}"),
            score: i as u32 * 10,
            tags: vec!["ranked", "online"],
        })
        .collect()
}

fn bench_dump_scalars(c: &mut Criterion) {
    let mut group = c.benchmark_group("dump_scalars");

    group.bench_function("int", |bench| {
        bench.iter(|| black_box(Dump::new(black_box(&42i64))));
    });
    group.bench_function("string", |bench| {
        let text = "one\ntwo\nthree".to_string();
        bench.iter(|| black_box(Dump::new(black_box(&text))));
    });
    group.bench_function("binary", |bench| {
        let bytes: Vec<u8> = (0..=255).collect();
        bench.iter(|| black_box(Dump::new(black_box(bytes.as_slice()))));
    });

    group.finish();
}

fn bench_dump_structs(c: &mut Criterion) {
    let mut group = c.benchmark_group("dump_structs");

    for size in [1, 10, 100] {
        let data = players(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |bench, data| {
            bench.iter(|| black_box(Dump::new(black_box(data))));
        });
    }

    group.finish();
}

fn bench_reflect_map(c: &mut Criterion) {
    let map: BTreeMap<String, i32> = (0..100).map(|i| (format!("key-{i}"), i)).collect();
    c.bench_function("reflect_map_100", |bench| {
        bench.iter(|| black_box(reflect(black_box(&map))));
    });
}

fn bench_unified_diff(c: &mut Criterion) {
    let mut group = c.benchmark_group("unified_diff");

    for lines in [10, 100, 1000] {
        let expected: String = (0..lines).map(|i| format!("line {i}\n")).collect();
        let actual = expected.replace("line 5\n", "line five\n");
        group.bench_with_input(
            BenchmarkId::from_parameter(lines),
            &(expected, actual),
            |bench, (e, a)| {
                bench.iter(|| black_box(unified(black_box(e), black_box(a), 1)));
            },
        );
    }

    group.finish();
}

fn bench_checks(c: &mut Criterion) {
    let mut group = c.benchmark_group("checks");

    group.bench_function("equal_pass", |bench| {
        let t = Check::new("bench");
        bench.iter(|| black_box(t.equal(black_box(&1), black_box(&1))));
    });
    group.bench_function("equal_fail", |bench| {
        let t = Check::with_config("bench", CheckConfig::new().with_verify_on_drop(false));
        bench.iter(|| {
            t.equal(black_box(&"one\ntwo"), black_box(&"one\nTWO"));
            black_box(t.take_failures())
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_dump_scalars,
    bench_dump_structs,
    bench_reflect_map,
    bench_unified_diff,
    bench_checks
);
criterion_main!(benches);
