//! Benchmarks for the hot per-turn paths.
//!
//! Run with: `cargo bench -p arena_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use arena_core::events::{Event, EventPayload, EventQueue, Outbox};
use arena_core::rules;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// Velocity-profile math, evaluated for every moving robot every turn.
pub fn velocity_benchmark(c: &mut Criterion) {
    c.bench_function("next_velocity_sweep", |b| {
        b.iter(|| {
            let mut v = 0.0;
            for distance in 1..200 {
                v = rules::next_velocity(black_box(v), f64::from(distance), rules::MAX_VELOCITY);
            }
            black_box(v)
        })
    });

    c.bench_function("distance_until_stop", |b| {
        b.iter(|| black_box(rules::distance_until_stop(black_box(8.0), rules::MAX_VELOCITY)))
    });
}

/// Outbox transfer plus the total-order sort, done once per agent turn.
pub fn event_queue_benchmark(c: &mut Criterion) {
    c.bench_function("event_queue_refresh_64", |b| {
        b.iter(|| {
            let outbox = Outbox::new();
            for turn in 0..64u64 {
                outbox.append(Event {
                    turn: turn % 3,
                    payload: EventPayload::HitWall { bearing: 0.0 },
                });
            }
            let mut queue = EventQueue::new();
            queue.refresh(&outbox, 2);
            black_box(queue)
        })
    });
}

criterion_group!(benches, velocity_benchmark, event_queue_benchmark);
criterion_main!(benches);
