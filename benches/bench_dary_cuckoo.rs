use criterion::{criterion_group, criterion_main, Criterion};
use dary_cuckoo_filter::CuckooFilterBuilder;

pub fn bench_add(c: &mut Criterion) {
    let mut cf = CuckooFilterBuilder::new(500_000).d(3).bits_per_tag(8).build().unwrap();
    c.bench_function("bench_add_entries", |b| {
        b.iter(|| {
            std::hint::black_box(for i in 0..1_000_000_u64 {
                cf.add(i.to_ne_bytes());
            });
        })
    });
}

pub fn bench_contains(c: &mut Criterion) {
    let mut cf = CuckooFilterBuilder::new(500_000).d(3).bits_per_tag(8).build().unwrap();
    for i in 0..1_000_000_u64 {
        cf.add(i.to_ne_bytes());
    }
    c.bench_function("bench_contains_existing", |b| {
        b.iter(|| {
            std::hint::black_box(for i in 0..1_000_000_u64 {
                cf.contains(i.to_ne_bytes());
            })
        })
    });
    c.bench_function("bench_contains_nonexisting", |b| {
        b.iter(|| {
            std::hint::black_box(for i in 1_000_000_u64..2_000_000_u64 {
                cf.contains(i.to_ne_bytes());
            })
        })
    });
}

criterion_group!(bench_dary_cuckoo, bench_add, bench_contains);
criterion_main!(bench_dary_cuckoo);
