//! End-to-end kernel loads and launches on the host accelerator
//!
//! Routines written as plain functions over typed indices, views, and
//! scalars travel the whole path here: source classification, resolution,
//! accelerator load, launch, synchronize, read back.

use refract_kernels::{KernelLoader, KernelSource, LoadResult, Tuning};
use refract_runtime::{
    Accelerator, AcceleratorError, Buffer, BufferView, HostAccelerator, Index1D, Index2D, Specialization,
};

fn patch(index: Index1D, out: BufferView<i32>, constant: i32) {
    out.store(index.x(), index.x() as i32 + constant);
}

fn ramp(index: Index1D, out: BufferView<f32>, scale: f32, offset: f32) {
    out.store(index.x(), index.x() as f32 * scale + offset);
}

fn cell_tag(index: Index2D, out: BufferView<u32>, width: u32) {
    let linear = index.x + index.y * width as usize;
    out.store(linear, index.x as u32 * 100 + index.y as u32);
}

fn saxpy(index: Index1D, x: BufferView<f32>, y: BufferView<f32>, a: f32) {
    let i = index.x();
    y.store(i, a * x.load(i) + y.load(i));
}

#[test]
fn test_auto_grouped_patch() -> LoadResult<()> {
    let _ = refract_tracing::init_global_tracing(&refract_tracing::TracingConfig::for_ci());

    let accelerator = HostAccelerator::new();
    let loader = KernelLoader::new(&accelerator);

    let (launcher, occupancy) = loader.load_auto_grouped_stream_kernel_with_occupancy(patch)?;
    assert!(occupancy.group_size > 0);
    assert!(occupancy.min_grid_size > 0);
    assert_eq!(launcher.group_size(), occupancy.group_size);

    let buffer = Buffer::<i32>::allocate(&accelerator, 1024)?;
    let stream = accelerator.create_stream();
    launcher.launch(&stream, Index1D::new(1024), (buffer.view(), 42))?;
    accelerator.synchronize(&stream)?;

    let result = buffer.to_vec(&accelerator)?;
    for (i, value) in result.iter().enumerate() {
        assert_eq!(*value, i as i32 + 42); // thread i wrote i + 42
    }
    buffer.free(&accelerator)?;
    Ok(())
}

#[test]
fn test_launcher_reuse() -> LoadResult<()> {
    let accelerator = HostAccelerator::new();
    let loader = KernelLoader::new(&accelerator);
    let launcher = loader.load_auto_grouped_stream_kernel(patch)?;

    let buffer = Buffer::<i32>::allocate(&accelerator, 64)?;
    let stream = accelerator.default_stream();

    launcher.launch(&stream, Index1D::new(64), (buffer.view(), 1))?;
    accelerator.synchronize(&stream)?;
    assert_eq!(buffer.to_vec(&accelerator)?[10], 11); // 10 + 1

    launcher.launch(&stream, Index1D::new(64), (buffer.view(), -10))?;
    accelerator.synchronize(&stream)?;
    assert_eq!(buffer.to_vec(&accelerator)?[10], 0); // 10 - 10

    buffer.free(&accelerator)?;
    Ok(())
}

#[test]
fn test_default_stream_launcher() -> LoadResult<()> {
    let accelerator = HostAccelerator::new();
    let loader = KernelLoader::new(&accelerator);
    let launcher = loader.load_kernel(ramp)?;
    assert_eq!(launcher.stream(), accelerator.default_stream());

    let buffer = Buffer::<f32>::allocate(&accelerator, 256)?;
    launcher.launch(Index1D::new(256), (buffer.view(), 0.5, 2.0))?;
    accelerator.synchronize(&launcher.stream())?;

    let result = buffer.to_vec(&accelerator)?;
    assert_eq!(result[0], 2.0); // 0 * 0.5 + 2
    assert_eq!(result[7], 5.5); // 7 * 0.5 + 2
    assert_eq!(result[255], 129.5); // 255 * 0.5 + 2
    Ok(())
}

#[test]
fn test_two_dimensional_index() -> LoadResult<()> {
    let accelerator = HostAccelerator::new();
    let loader = KernelLoader::new(&accelerator);
    let launcher = loader.load_implicitly_grouped_stream_kernel(cell_tag, 5)?;
    assert_eq!(launcher.group_size(), 5);

    let buffer = Buffer::<u32>::allocate(&accelerator, 32)?;
    let stream = accelerator.create_stream();
    launcher.launch(&stream, Index2D::new(8, 4), (buffer.view(), 8))?;
    accelerator.synchronize(&stream)?;

    let result = buffer.to_vec(&accelerator)?;
    assert_eq!(result[0], 0); // (0, 0)
    assert_eq!(result[3], 300); // (3, 0)
    assert_eq!(result[8], 1); // (0, 1)
    assert_eq!(result[3 + 2 * 8], 302); // (3, 2)
    Ok(())
}

#[test]
fn test_saxpy_two_views() -> LoadResult<()> {
    let accelerator = HostAccelerator::new();
    let loader = KernelLoader::new(&accelerator);
    let launcher = loader.load_specialized_stream_kernel(saxpy, &Specialization::none().with_max_group_size(16))?;
    assert_eq!(launcher.group_size(), 16);

    let n = 512;
    let mut x = Buffer::<f32>::allocate(&accelerator, n)?;
    let mut y = Buffer::<f32>::allocate(&accelerator, n)?;
    let data: Vec<f32> = (0..n).map(|i| i as f32).collect();
    x.copy_from_slice(&accelerator, &data)?;
    y.copy_from_slice(&accelerator, &vec![2.0f32; n])?;

    let stream = accelerator.create_stream();
    launcher.launch(&stream, Index1D::new(n), (x.view(), y.view(), 0.5))?;
    accelerator.synchronize(&stream)?;

    let result = y.to_vec(&accelerator)?;
    assert_eq!(result[0], 2.0); // 0.5 * 0 + 2
    assert_eq!(result[10], 7.0); // 0.5 * 10 + 2
    assert_eq!(result[511], 257.5); // 0.5 * 511 + 2
    Ok(())
}

#[test]
fn test_empty_extent_error_passes_through() -> LoadResult<()> {
    let accelerator = HostAccelerator::new();
    let loader = KernelLoader::new(&accelerator);
    let launcher = loader.load_stream_kernel(patch)?;

    let buffer = Buffer::<i32>::allocate(&accelerator, 4)?;
    let err = launcher
        .launch(&accelerator.default_stream(), Index1D::new(0), (buffer.view(), 0))
        .unwrap_err();
    assert!(matches!(err, AcceleratorError::InvalidLaunchConfig(_)));
    Ok(())
}

#[test]
fn test_from_source_on_host() -> LoadResult<()> {
    let accelerator = HostAccelerator::new();
    let loader = KernelLoader::new(&accelerator);

    let source = KernelSource::new(patch);
    let (launcher, occupancy) = loader.load_kernel_from_source(Some(&source), &Tuning::AutoGrouped)?;
    assert!(occupancy.is_some());

    let buffer = Buffer::<i32>::allocate(&accelerator, 128)?;
    launcher.launch(Index1D::new(128), (buffer.view(), 7))?;
    accelerator.synchronize(&launcher.stream())?;

    assert_eq!(buffer.to_vec(&accelerator)?[100], 107); // 100 + 7
    Ok(())
}
