use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use sorted_hash_table::{Fnv1a, SortedHashTable};
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

// Sort-list insertion is a linear scan, so inserts are kept to a few thousand.
fn bench_set_fresh_2k(c: &mut Criterion) {
    let keys: Vec<String> = lcg(1).take(2_000).map(key).collect();
    c.bench_function("sorted::set_fresh_2k", |b| {
        b.iter_batched(
            || SortedHashTable::new(1024).unwrap(),
            |mut t| {
                for (i, k) in keys.iter().enumerate() {
                    t.set(k, &i.to_string()).unwrap();
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_set_ascending_2k(c: &mut Criterion) {
    // Ascending keys always scan to the tail.
    let keys: Vec<String> = (0..2_000u64).map(key).collect();
    c.bench_function("sorted::set_ascending_2k", |b| {
        b.iter_batched(
            || SortedHashTable::with_key_index(1024, Fnv1a).unwrap(),
            |mut t| {
                for k in &keys {
                    t.set(k, "v").unwrap();
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_update_existing_2k(c: &mut Criterion) {
    let keys: Vec<String> = lcg(2).take(2_000).map(key).collect();
    let mut t = SortedHashTable::new(1024).unwrap();
    for k in &keys {
        t.set(k, "0").unwrap();
    }
    c.bench_function("sorted::update_existing_2k", |b| {
        b.iter(|| {
            for k in &keys {
                t.set(k, "1").unwrap();
            }
        })
    });
}

fn bench_get_hit_miss(c: &mut Criterion) {
    let keys: Vec<String> = lcg(3).take(2_000).map(key).collect();
    let misses: Vec<String> = lcg(4).take(2_000).map(key).collect();
    let mut t = SortedHashTable::new(1024).unwrap();
    for k in &keys {
        t.set(k, "v").unwrap();
    }
    c.bench_function("sorted::get_hit_2k", |b| {
        b.iter(|| {
            for k in &keys {
                black_box(t.get(k));
            }
        })
    });
    c.bench_function("sorted::get_miss_2k", |b| {
        b.iter(|| {
            for k in &misses {
                black_box(t.get(k));
            }
        })
    });
}

fn bench_dump_2k(c: &mut Criterion) {
    let mut t = SortedHashTable::new(1024).unwrap();
    for k in lcg(5).take(2_000).map(key) {
        t.set(&k, "v").unwrap();
    }
    c.bench_function("sorted::dump_2k", |b| b.iter(|| black_box(t.to_string())));
    c.bench_function("sorted::dump_rev_2k", |b| {
        b.iter(|| black_box(t.display_rev().to_string()))
    });
}

fn config() -> Criterion {
    Criterion::default()
        .warm_up_time(Duration::from_millis(500))
        .measurement_time(Duration::from_secs(3))
}

criterion_group! {
    name = benches;
    config = config();
    targets = bench_set_fresh_2k, bench_set_ascending_2k, bench_update_existing_2k, bench_get_hit_miss, bench_dump_2k
}
criterion_main!(benches);
