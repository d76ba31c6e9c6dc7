use criterion::{
    black_box, criterion_group, criterion_main, measurement::WallTime, BenchmarkGroup, Criterion,
};
use idmask::{EightByteEngine, Engine, KeyStore, SecretKey, SixteenByteEngine};

fn store() -> KeyStore {
    KeyStore::new(SecretKey::from_hex(0, "9d5100cebffa729aaffecd3ad25dc5aeea4f13bb").unwrap())
}

fn engine(mut g: BenchmarkGroup<'_, WallTime>, engine: impl Engine, id: &[u8]) {
    let token = engine.mask(id).unwrap();

    g.bench_function("mask", |b| b.iter(|| engine.mask(black_box(id)).unwrap()));
    g.bench_function("unmask", |b| {
        b.iter(|| engine.unmask(black_box(&token)).unwrap())
    });

    g.finish();
}

pub fn criterion_benchmark(c: &mut Criterion) {
    engine(
        c.benchmark_group("eight/deterministic"),
        EightByteEngine::new(store()),
        b"8237291",
    );
    engine(
        c.benchmark_group("eight/randomized"),
        EightByteEngine::randomized(store()),
        b"8237291",
    );
    engine(
        c.benchmark_group("sixteen/deterministic"),
        SixteenByteEngine::new(store()),
        b"8237291-4471820",
    );
    engine(
        c.benchmark_group("sixteen/randomized"),
        SixteenByteEngine::randomized(store()),
        b"8237291-4471820",
    );
    engine(
        c.benchmark_group("sixteen/high-security"),
        SixteenByteEngine::new(store()).high_security(),
        b"8237291-4471820",
    );
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
