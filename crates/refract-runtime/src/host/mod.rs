//! In-process reference accelerator
//!
//! Executes kernels on the host CPU. The index space is partitioned into
//! groups of the loaded kernel's group size; groups run in parallel on the
//! rayon pool and lanes within a group run sequentially. Launches complete
//! before `invoke` returns, so per-stream ordering holds trivially and
//! `synchronize` has nothing left to wait for.
//!
//! Memory lives in a [`MemoryPool`] behind a `parking_lot::RwLock`. Kernels
//! reach it through raw view addresses without taking the lock; keeping
//! host copies and launches on overlapping buffers apart is the caller's
//! stream discipline, as on any device runtime.

use std::ptr::NonNull;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use rayon::prelude::*;

use crate::accelerator::{Accelerator, KernelHandle, LoadedKernel};
use crate::args::KernelArgs;
use crate::error::{AcceleratorError, Result};
use crate::index::Extent;
use crate::kernel::KernelFn;
use crate::stream::Stream;
use crate::types::{BufferHandle, Occupancy, Specialization};

mod memory;
use memory::MemoryPool;

/// Group size used when the caller leaves grouping to the accelerator
const DEFAULT_GROUP_SIZE: usize = 64;

static NEXT_ACCELERATOR_ID: AtomicU64 = AtomicU64::new(1);

/// CPU-backed accelerator
///
/// Cheap to clone; clones share the same memory and stream namespace.
#[derive(Debug, Clone)]
pub struct HostAccelerator {
    id: u64,
    memory: Arc<RwLock<MemoryPool>>,
    next_stream_id: Arc<AtomicU64>,
    worker_threads: usize,
}

impl HostAccelerator {
    /// Create a new host accelerator
    #[tracing::instrument]
    pub fn new() -> Self {
        let id = NEXT_ACCELERATOR_ID.fetch_add(1, Ordering::Relaxed);
        let worker_threads = rayon::current_num_threads();
        tracing::debug!(id, worker_threads, "host_accelerator_created");
        Self {
            id,
            memory: Arc::new(RwLock::new(MemoryPool::new())),
            // stream 0 is the default stream
            next_stream_id: Arc::new(AtomicU64::new(1)),
            worker_threads,
        }
    }

    fn retain(&self, kernel: &KernelFn, group_size: usize) -> KernelHandle {
        KernelHandle::new(Arc::new(HostKernel {
            kernel: *kernel,
            group_size,
            accelerator_id: self.id,
        }))
    }
}

impl Default for HostAccelerator {
    fn default() -> Self {
        Self::new()
    }
}

fn check_affinity(id: u64, stream: &Stream) -> Result<()> {
    if stream.accelerator_id() != id {
        return Err(AcceleratorError::ForeignStream {
            stream: stream.id(),
            owner: stream.accelerator_id(),
            actual: id,
        });
    }
    Ok(())
}

impl Accelerator for HostAccelerator {
    fn name(&self) -> &str {
        "host"
    }

    fn id(&self) -> u64 {
        self.id
    }

    #[tracing::instrument(skip(self, kernel), fields(kernel = kernel.name(), arity = kernel.arity()))]
    fn load_kernel(&self, kernel: &KernelFn) -> Result<KernelHandle> {
        Ok(self.retain(kernel, DEFAULT_GROUP_SIZE))
    }

    #[tracing::instrument(skip(self, kernel, specialization), fields(kernel = kernel.name(), %specialization))]
    fn load_specialized_kernel(&self, kernel: &KernelFn, specialization: &Specialization) -> Result<KernelHandle> {
        // The host honors the group-size cap and accepts the remaining
        // hints without effect.
        let group_size = match specialization.max_group_size {
            Some(0) => return Err(AcceleratorError::invalid_launch("specialization max_group_size is 0")),
            Some(cap) => DEFAULT_GROUP_SIZE.min(cap),
            None => DEFAULT_GROUP_SIZE,
        };
        Ok(self.retain(kernel, group_size))
    }

    #[tracing::instrument(skip(self, kernel), fields(kernel = kernel.name(), group_size))]
    fn load_implicitly_grouped_kernel(&self, kernel: &KernelFn, group_size: usize) -> Result<KernelHandle> {
        if group_size == 0 {
            return Err(AcceleratorError::invalid_launch("group size is 0"));
        }
        Ok(self.retain(kernel, group_size))
    }

    #[tracing::instrument(skip(self, kernel), fields(kernel = kernel.name()))]
    fn load_auto_grouped_kernel(&self, kernel: &KernelFn) -> Result<(KernelHandle, Occupancy)> {
        let occupancy = Occupancy::new(DEFAULT_GROUP_SIZE, self.worker_threads.max(1));
        Ok((self.retain(kernel, occupancy.group_size), occupancy))
    }

    fn default_stream(&self) -> Stream {
        Stream::new(self.id, 0)
    }

    fn create_stream(&self) -> Stream {
        Stream::new(self.id, self.next_stream_id.fetch_add(1, Ordering::Relaxed))
    }

    fn synchronize(&self, stream: &Stream) -> Result<()> {
        check_affinity(self.id, stream)?;
        // Launches are synchronous; every stream is already drained.
        Ok(())
    }

    fn allocate_buffer(&self, size: usize) -> Result<BufferHandle> {
        let handle = self.memory.write().allocate(size);
        tracing::trace!(%handle, size, "buffer_allocate");
        Ok(handle)
    }

    fn free_buffer(&self, handle: BufferHandle) -> Result<()> {
        self.memory.write().free(handle)
    }

    fn copy_to_buffer(&self, handle: BufferHandle, offset: usize, data: &[u8]) -> Result<()> {
        self.memory.write().copy_to(handle, offset, data)
    }

    fn copy_from_buffer(&self, handle: BufferHandle, offset: usize, data: &mut [u8]) -> Result<()> {
        self.memory.read().copy_from(handle, offset, data)
    }

    fn buffer_size(&self, handle: BufferHandle) -> Result<usize> {
        self.memory.read().size(handle)
    }

    fn buffer_ptr(&self, handle: BufferHandle) -> Result<NonNull<u8>> {
        self.memory.read().base_ptr(handle)
    }
}

/// A kernel retained by the host accelerator
struct HostKernel {
    kernel: KernelFn,
    group_size: usize,
    accelerator_id: u64,
}

impl LoadedKernel for HostKernel {
    fn kernel_name(&self) -> &str {
        self.kernel.name()
    }

    fn group_size(&self) -> usize {
        self.group_size
    }

    fn invoke(&self, stream: &Stream, extent: Extent, args: &KernelArgs) -> Result<()> {
        check_affinity(self.accelerator_id, stream)?;

        if args.len() != self.kernel.arity() {
            return Err(AcceleratorError::ArgumentCountMismatch {
                kernel: self.kernel.name().to_string(),
                expected: self.kernel.arity(),
                actual: args.len(),
            });
        }

        let total = extent.total();
        if total == 0 {
            return Err(AcceleratorError::invalid_launch(format!("empty extent {extent}")));
        }

        let _perf = refract_tracing::perf_span!("kernel_invoke", kernel = self.kernel.name(), threads = total);

        let start = Instant::now();
        let group_size = self.group_size;
        let groups = total.div_ceil(group_size);

        (0..groups).into_par_iter().try_for_each(|group_idx| -> Result<()> {
            let first = group_idx * group_size;
            let last = (first + group_size).min(total);
            for linear in first..last {
                self.kernel.run_thread(extent.coords_of(linear), args)?;
            }
            Ok(())
        })?;

        let duration_us = start.elapsed().as_micros() as u64;
        tracing::debug!(
            kernel = self.kernel.name(),
            %stream,
            %extent,
            threads = total,
            groups,
            group_size,
            duration_us,
            "kernel_invoke_complete"
        );
        Ok(())
    }
}

// ================================================================================================
// Tests
// ================================================================================================
