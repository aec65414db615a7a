use criterion::{black_box, criterion_group, criterion_main, Criterion};
use linear::{residual, Dense, LSolver, Matrix};
use rand::{distributions::Uniform, rngs::StdRng, Rng, SeedableRng};

fn bench_dense(cols: usize) {
    // Fill A matrix with uniform random data in [0,1/cols]
    // Add anti-identity to ensure the solver needs to do row-swapping
    let mut rng = StdRng::seed_from_u64(cols as u64);
    let dist = Uniform::new(0.0, 1.0 / (cols as f64));
    let mut data: Vec<f64> = (0..cols * cols).map(|_| rng.sample(dist)).collect();
    for i in 0..cols {
        data[i * cols + (cols - 1 - i)] += 1.0;
    }
    let mat_a = Matrix::from_vec(cols, cols, data).unwrap();

    // Fill b vector with uniform random data in [0,1]
    let b: Vec<f64> = (0..cols).map(|_| rng.gen_range(0.0..1.0)).collect();

    let mut dense = Dense::new();
    dense.setup(&mat_a).unwrap();
    let x = dense.solve(&b).unwrap();

    let norm = residual::norm(&mat_a, &x, &b).unwrap();
    assert!(norm < 1e-10, "residual {norm}");
}

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("Dense solver 5", |b| b.iter(|| bench_dense(black_box(5))));
    c.bench_function("Dense solver 10", |b| b.iter(|| bench_dense(black_box(10))));
    c.bench_function("Dense solver 50", |b| b.iter(|| bench_dense(black_box(50))));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
