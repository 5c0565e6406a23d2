use criterion::{criterion_group, criterion_main, Criterion};
use glyphd::model::{Dense, Network};
use ndarray::{Array1, Array2};
use std::hint::black_box;

fn forward_benchmark(c: &mut Criterion) {
    let network = Network::new(vec![
        Dense::new(Array2::from_elem((128, 784), 0.01), Array1::zeros(128)).unwrap(),
        Dense::new(Array2::from_elem((64, 128), 0.01), Array1::zeros(64)).unwrap(),
        Dense::new(Array2::from_elem((10, 64), 0.01), Array1::zeros(10)).unwrap(),
    ])
    .unwrap();

    let input = Array1::from_elem(784, 0.5f32);

    c.bench_function("forward_784_128_64_10", |b| {
        b.iter(|| network.forward(black_box(&input)).unwrap())
    });
}

criterion_group!(benches, forward_benchmark);
criterion_main!(benches);
