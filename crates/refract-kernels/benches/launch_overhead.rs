//! Load and launch overhead benchmarks
//!
//! Measures the adapter path in isolation: argument pack encoding,
//! fresh kernel loads, and full launches on the host accelerator.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use refract_kernels::{KernelLoader, KernelParams};
use refract_runtime::{Accelerator, Buffer, BufferView, HostAccelerator, Index1D};

fn fill(index: Index1D, out: BufferView<f32>, value: f32) {
    out.store(index.x(), index.x() as f32 + value);
}

/// Benchmark tuple-to-argument-pack encoding at representative arities
fn benchmark_param_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("param_encode");

    group.bench_function("arity_2", |bencher| {
        let params = (42i32, 0.5f32);
        bencher.iter(|| black_box(params.encode()));
    });

    group.bench_function("arity_8", |bencher| {
        let params = (1u8, 2u16, 3u32, 4u64, -5i8, -6i16, -7i32, -8i64);
        bencher.iter(|| black_box(params.encode()));
    });

    group.bench_function("arity_14", |bencher| {
        let params = (
            1u8, 2u16, 3u32, 4u64, -5i8, -6i16, -7i32, -8i64, 2.5f32, -0.5f64, 9usize, -10isize, 11u32, 12i32,
        );
        bencher.iter(|| black_box(params.encode()));
    });

    group.finish();
}

/// Benchmark fresh loads (each call resolves and loads again)
fn benchmark_kernel_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("kernel_load");
    let accelerator = HostAccelerator::new();
    let loader = KernelLoader::new(&accelerator);

    group.bench_function("default", |bencher| {
        bencher.iter(|| black_box(loader.load_stream_kernel(fill).unwrap()));
    });

    group.bench_function("auto_grouped", |bencher| {
        bencher.iter(|| black_box(loader.load_auto_grouped_stream_kernel_with_occupancy(fill).unwrap()));
    });

    group.finish();
}

/// Benchmark full launches through a loaded launcher
fn benchmark_kernel_launch(c: &mut Criterion) {
    let mut group = c.benchmark_group("kernel_launch");

    for size in [1_024, 4_096, 16_384].iter() {
        group.throughput(Throughput::Elements(*size as u64));

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |bencher, &size| {
            let accelerator = HostAccelerator::new();
            let loader = KernelLoader::new(&accelerator);
            let launcher = loader.load_auto_grouped_stream_kernel(fill).unwrap();
            let buffer = Buffer::<f32>::allocate(&accelerator, size).unwrap();
            let stream = accelerator.create_stream();

            bencher.iter(|| {
                launcher.launch(&stream, Index1D::new(size), (buffer.view(), 1.0)).unwrap();
            });
        });
    }

    group.finish();
}

criterion_group!(
    launch_benches,
    benchmark_param_encode,
    benchmark_kernel_load,
    benchmark_kernel_launch
);

criterion_main!(launch_benches);
