//! Segment access benchmarks

use criterion::{Criterion, criterion_group, criterion_main};
use rov_store::{DataManager, Value};
use std::hint::black_box;

/// Benchmark single-key access on the control segment
fn bench_single_key(c: &mut Criterion) {
    let store = DataManager::in_memory().unwrap();
    let control = store.control();

    c.bench_function("control_set_float", |b| {
        b.iter(|| {
            control.set("manual-yaw", black_box(0.25)).unwrap();
        });
    });

    c.bench_function("control_get_float", |b| {
        b.iter(|| {
            black_box(control.get("manual-yaw").unwrap());
        });
    });
}

/// Benchmark whole-segment snapshots as taken once per exchange iteration
fn bench_snapshots(c: &mut Criterion) {
    let store = DataManager::in_memory().unwrap();
    let transmission = store.transmission();

    c.bench_function("transmission_all", |b| {
        b.iter(|| {
            black_box(transmission.all().unwrap());
        });
    });

    c.bench_function("transmission_all_raw", |b| {
        b.iter(|| {
            black_box(transmission.all_raw().unwrap());
        });
    });

    let telemetry = vec![
        ("S_A".to_string(), Value::Int(10)),
        ("S_B".to_string(), Value::Int(20)),
        ("A_A".to_string(), Value::Bool(true)),
    ];
    c.bench_function("received_update", |b| {
        b.iter(|| {
            store.received().update(telemetry.iter().cloned()).unwrap();
        });
    });
}

criterion_group!(benches, bench_single_key, bench_snapshots);
criterion_main!(benches);
