use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ndarray::Array2;
use seisattr::kernel::KernelLifecycle;
use seisattr::signal::attributes::{
    Attribute, AttributeConfig, AttributeKernel, TraceGridConfig, TraceGridKernel,
};
use seisattr::signal::traits::{SelectedGridAttributes, TraceGridAttributes};

/// 500 traces x 1501 samples of dipping sinusoids.
fn section() -> Array2<f64> {
    Array2::from_shape_fn((500, 1501), |(trace, sample)| {
        let t = sample as f64 * 0.002 + trace as f64 * 0.0005;
        (2.0 * core::f64::consts::PI * 30.0 * t).sin() * (-t).exp()
    })
}

fn trace_grid(c: &mut Criterion, name: &str, parallel: bool) {
    let kernel = TraceGridKernel::try_new(TraceGridConfig { parallel }).expect("valid grid config");
    let grid = section();

    c.bench_function(name, |b| {
        b.iter(|| {
            black_box(
                kernel
                    .run_alloc(&grid)
                    .expect("benchmark input should satisfy grid preconditions"),
            );
        });
    });
}

fn trace_grid_sequential(c: &mut Criterion) {
    trace_grid(c, "trace_grid_500x1501_sequential", false);
}

fn trace_grid_parallel(c: &mut Criterion) {
    trace_grid(c, "trace_grid_500x1501_parallel", true);
}

fn extended_attributes(c: &mut Criterion) {
    let kernel = AttributeKernel::try_new(AttributeConfig {
        attributes: vec![
            Attribute::Envelope,
            Attribute::Frequency,
            Attribute::Bandwidth,
            Attribute::Sweetness,
        ],
        sample_interval: 0.002,
        parallel: true,
    })
    .expect("valid attribute config");
    let grid = section();

    c.bench_function("extended_attributes_500x1501", |b| {
        b.iter(|| {
            black_box(
                kernel
                    .run_alloc(&grid)
                    .expect("benchmark input should satisfy grid preconditions"),
            );
        });
    });
}

criterion_group!(
    benches,
    trace_grid_sequential,
    trace_grid_parallel,
    extended_attributes
);
criterion_main!(benches);
