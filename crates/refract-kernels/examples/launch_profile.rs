//! Kernel Launch Walkthrough
//!
//! Loads plain-function kernels through each tuning mode, launches them on
//! the host accelerator, and prints per-launch timings.
//!
//! ## Running with Tracing
//!
//! ```bash
//! # Basic execution
//! cargo run --example launch_profile --release
//!
//! # With debug tracing (shows loads and launches)
//! REFRACT_TRACING_DIRECTIVES=refract_runtime=debug,refract_kernels=debug \
//!     cargo run --example launch_profile
//! ```

use std::time::Instant;

use refract_kernels::{KernelLoader, LoadResult};
use refract_runtime::{Accelerator, Buffer, BufferView, HostAccelerator, Index1D, Index2D, Specialization};
use refract_tracing::{init_global_tracing, TracingConfig};

fn patch(index: Index1D, out: BufferView<i32>, constant: i32) {
    out.store(index.x(), index.x() as i32 + constant);
}

fn saxpy(index: Index1D, x: BufferView<f32>, y: BufferView<f32>, a: f32) {
    let i = index.x();
    y.store(i, a * x.load(i) + y.load(i));
}

fn cell_tag(index: Index2D, out: BufferView<u32>, width: u32) {
    let linear = index.x + index.y * width as usize;
    out.store(linear, index.x as u32 * 100 + index.y as u32);
}

fn main() -> LoadResult<()> {
    if let Err(err) = init_global_tracing(&TracingConfig::from_env()) {
        eprintln!("tracing disabled: {err}");
    }

    let separator = "=".repeat(80);
    println!("{}", separator);
    println!("Refract Kernel Launch Walkthrough");
    println!("{}", separator);
    println!();

    const N: usize = 1 << 20;

    let accelerator = HostAccelerator::new();
    let loader = KernelLoader::new(&accelerator);
    println!("Accelerator:  {} (id {})", accelerator.name(), accelerator.id());
    println!("Elements:     {}", N);
    println!();

    // Auto-grouped load with the occupancy the accelerator suggests
    let (launcher, occupancy) = loader.load_auto_grouped_stream_kernel_with_occupancy(patch)?;
    println!("--- Auto-grouped: patch ---");
    println!("  occupancy: {}", occupancy);

    let buffer = Buffer::<i32>::allocate(&accelerator, N)?;
    let stream = accelerator.create_stream();

    let start = Instant::now();
    launcher.launch(&stream, Index1D::new(N), (buffer.view(), 42))?;
    accelerator.synchronize(&stream)?;
    let elapsed = start.elapsed();

    let result = buffer.to_vec(&accelerator)?;
    println!("  launched {} threads in {:.2?}", N, elapsed);
    println!("  result[0] = {}, result[{}] = {}", result[0], N - 1, result[N - 1]);
    buffer.free(&accelerator)?;
    println!();

    // Specialized load capped to a narrow group
    let launcher =
        loader.load_specialized_stream_kernel(saxpy, &Specialization::none().with_max_group_size(32))?;
    println!("--- Specialized (max group 32): saxpy ---");
    println!("  group size: {}", launcher.group_size());

    let mut x = Buffer::<f32>::allocate(&accelerator, N)?;
    let mut y = Buffer::<f32>::allocate(&accelerator, N)?;
    x.copy_from_slice(&accelerator, &(0..N).map(|i| i as f32).collect::<Vec<_>>())?;
    y.copy_from_slice(&accelerator, &vec![1.0f32; N])?;

    let start = Instant::now();
    launcher.launch(&stream, Index1D::new(N), (x.view(), y.view(), 0.5))?;
    accelerator.synchronize(&stream)?;
    println!("  y = 0.5 * x + y over {} elements in {:.2?}", N, start.elapsed());
    println!("  y[10] = {}", y.to_vec(&accelerator)?[10]);
    x.free(&accelerator)?;
    y.free(&accelerator)?;
    println!();

    // Implicitly grouped 2-D launch on the default stream
    let launcher = loader.load_implicitly_grouped_kernel(cell_tag, 16)?;
    println!("--- Implicitly grouped (16): cell_tag ---");

    let width = 1024usize;
    let height = 512usize;
    let tags = Buffer::<u32>::allocate(&accelerator, width * height)?;

    let start = Instant::now();
    launcher.launch(Index2D::new(width, height), (tags.view(), width as u32))?;
    accelerator.synchronize(&launcher.stream())?;
    println!("  tagged {}x{} cells in {:.2?}", width, height, start.elapsed());
    println!("  tag(3, 2) = {}", tags.to_vec(&accelerator)?[3 + 2 * width]);
    tags.free(&accelerator)?;
    println!();

    println!("{}", separator);
    println!("Done");
    println!("{}", separator);
    Ok(())
}
