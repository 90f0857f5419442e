use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use hashbrown::HashMap;
use prime_table::PrimeTable;
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn bench_insert(c: &mut Criterion) {
    let mut g = c.benchmark_group("insert_10k");
    g.bench_function("prime_table_from_smallest", |b| {
        b.iter_batched(
            || PrimeTable::<u64, u64>::new(0).unwrap(),
            |mut t| {
                for (i, x) in lcg(1).take(10_000).enumerate() {
                    t.insert(x, i as u64).unwrap();
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
    g.bench_function("prime_table_presized", |b| {
        b.iter_batched(
            || PrimeTable::<u64, u64>::with_capacity(12_500).unwrap(),
            |mut t| {
                for (i, x) in lcg(1).take(10_000).enumerate() {
                    t.insert(x, i as u64).unwrap();
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
    g.bench_function("hashbrown", |b| {
        b.iter_batched(
            HashMap::<u64, u64>::new,
            |mut m| {
                for (i, x) in lcg(1).take(10_000).enumerate() {
                    m.insert(x, i as u64);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
    g.finish();
}

fn bench_get_hit(c: &mut Criterion) {
    let keys: Vec<u64> = lcg(7).take(20_000).collect();
    let mut t = PrimeTable::<u64, u64>::new(0).unwrap();
    let mut m = HashMap::new();
    for (i, &k) in keys.iter().enumerate() {
        t.insert(k, i as u64).unwrap();
        m.insert(k, i as u64);
    }

    let mut g = c.benchmark_group("get_hit");
    g.bench_function("prime_table", |b| {
        let mut it = keys.iter().cycle();
        b.iter(|| black_box(t.get(it.next().unwrap())))
    });
    g.bench_function("hashbrown", |b| {
        let mut it = keys.iter().cycle();
        b.iter(|| black_box(m.get(it.next().unwrap())))
    });
    g.finish();
}

fn bench_get_miss(c: &mut Criterion) {
    let mut t = PrimeTable::<u64, u64>::new(0).unwrap();
    for (i, x) in lcg(11).take(10_000).enumerate() {
        t.insert(x, i as u64).unwrap();
    }
    c.bench_function("prime_table_get_miss", |b| {
        let mut miss = lcg(0xdead_beef);
        b.iter(|| black_box(t.get(&miss.next().unwrap())))
    });
}

fn bench_remove_reinsert(c: &mut Criterion) {
    c.bench_function("prime_table_remove_reinsert", |b| {
        let keys: Vec<u64> = lcg(3).take(5_000).collect();
        let mut t = PrimeTable::<u64, u64>::new(0).unwrap();
        for (i, &k) in keys.iter().enumerate() {
            t.insert(k, i as u64).unwrap();
        }
        let mut it = keys.iter().cycle();
        b.iter(|| {
            let k = *it.next().unwrap();
            let v = t.remove(&k).unwrap();
            t.insert(k, v).unwrap();
        })
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(8))
        .warm_up_time(Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_insert, bench_get_hit, bench_get_miss, bench_remove_reinsert
}
criterion_main!(benches);
