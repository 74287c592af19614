use criterion::{criterion_group, criterion_main, Criterion};
use kevlar::EncU64;

criterion_main!(benches);
criterion_group!(benches, bench_construction, bench_arithmetic, bench_relational);

fn bench_construction(c: &mut Criterion) {
    let _ = env_logger::try_init();
    c.bench_function("EncU64::new", |b| {
        b.iter(|| EncU64::new(0x1234_5678_9abc_def0));
    });

    c.bench_function("EncU64::get_value", |b| {
        let v = EncU64::new(0x1234_5678_9abc_def0);
        b.iter(|| v.get_value());
    });
}

fn bench_arithmetic(c: &mut Criterion) {
    let _ = env_logger::try_init();
    let a = EncU64::new(123_456);
    let b = EncU64::new(654_321);

    c.bench_function("EncU64 add", |bench| {
        bench.iter(|| &a + &b);
    });

    c.bench_function("EncU64 mul", |bench| {
        bench.iter(|| &a * &b);
    });

    c.bench_function("EncU64 div", |bench| {
        bench.iter(|| &b / &a);
    });
}

fn bench_relational(c: &mut Criterion) {
    let _ = env_logger::try_init();
    let a = EncU64::new(1);
    let b = EncU64::new(2);

    c.bench_function("EncU64 <", |bench| {
        bench.iter(|| a < b);
    });
}
