//! Recording accelerator shared by the loader integration tests
//!
//! Implements the accelerator contract without executing anything: every
//! load and every invoke is appended to a log the tests inspect, and both
//! paths can be switched to fail on demand.

#![allow(dead_code)]

use std::ptr::NonNull;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use refract_runtime::{
    Accelerator, AcceleratorError, BufferHandle, Extent, KernelArgs, KernelFn, KernelHandle, LoadedKernel,
    Occupancy, Result, Specialization, Stream,
};

/// Instance id reported by every recording accelerator.
pub const ACCELERATOR_ID: u64 = 7;

/// Occupancy reported for every auto-grouped load.
pub const REPORTED_OCCUPANCY: Occupancy = Occupancy::new(128, 6);

/// One recorded load call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadRecord {
    Default { kernel: String, arity: usize },
    Specialized { kernel: String, specialization: Specialization },
    ImplicitlyGrouped { kernel: String, group_size: usize },
    AutoGrouped { kernel: String },
}

/// One recorded invoke call.
#[derive(Debug, Clone, PartialEq)]
pub struct InvokeRecord {
    pub kernel: String,
    pub stream: Stream,
    pub extent: Extent,
    pub args: KernelArgs,
}

/// Accelerator double that records every load and invoke.
pub struct RecordingAccelerator {
    loads: Mutex<Vec<LoadRecord>>,
    invokes: Arc<Mutex<Vec<InvokeRecord>>>,
    fail_loads: AtomicBool,
    fail_invokes: Arc<AtomicBool>,
    next_stream: AtomicU64,
}

impl RecordingAccelerator {
    pub fn new() -> Self {
        Self {
            loads: Mutex::new(Vec::new()),
            invokes: Arc::new(Mutex::new(Vec::new())),
            fail_loads: AtomicBool::new(false),
            fail_invokes: Arc::new(AtomicBool::new(false)),
            next_stream: AtomicU64::new(1),
        }
    }

    /// Every load call so far, in order.
    pub fn loads(&self) -> Vec<LoadRecord> {
        self.loads.lock().clone()
    }

    pub fn load_count(&self) -> usize {
        self.loads.lock().len()
    }

    /// Every invoke call so far, in order.
    pub fn invokes(&self) -> Vec<InvokeRecord> {
        self.invokes.lock().clone()
    }

    pub fn invoke_count(&self) -> usize {
        self.invokes.lock().len()
    }

    /// Make every subsequent load fail.
    pub fn fail_loads(&self) {
        self.fail_loads.store(true, Ordering::SeqCst);
    }

    /// Make every subsequent invoke fail, including on already-loaded kernels.
    pub fn fail_invokes(&self) {
        self.fail_invokes.store(true, Ordering::SeqCst);
    }

    fn retain(&self, kernel: &KernelFn, group_size: usize) -> Result<KernelHandle> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(AcceleratorError::execution_error("injected load failure"));
        }
        Ok(KernelHandle::new(Arc::new(RecordedKernel {
            name: kernel.name().to_string(),
            group_size,
            invokes: self.invokes.clone(),
            fail: self.fail_invokes.clone(),
        })))
    }
}

impl Default for RecordingAccelerator {
    fn default() -> Self {
        Self::new()
    }
}

struct RecordedKernel {
    name: String,
    group_size: usize,
    invokes: Arc<Mutex<Vec<InvokeRecord>>>,
    fail: Arc<AtomicBool>,
}

impl LoadedKernel for RecordedKernel {
    fn kernel_name(&self) -> &str {
        &self.name
    }

    fn group_size(&self) -> usize {
        self.group_size
    }

    fn invoke(&self, stream: &Stream, extent: Extent, args: &KernelArgs) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AcceleratorError::execution_error("injected invoke failure"));
        }
        self.invokes.lock().push(InvokeRecord {
            kernel: self.name.clone(),
            stream: *stream,
            extent,
            args: args.clone(),
        });
        Ok(())
    }
}

impl Accelerator for RecordingAccelerator {
    fn name(&self) -> &str {
        "recording"
    }

    fn id(&self) -> u64 {
        ACCELERATOR_ID
    }

    fn load_kernel(&self, kernel: &KernelFn) -> Result<KernelHandle> {
        let handle = self.retain(kernel, 64)?;
        self.loads.lock().push(LoadRecord::Default {
            kernel: kernel.name().to_string(),
            arity: kernel.arity(),
        });
        Ok(handle)
    }

    fn load_specialized_kernel(&self, kernel: &KernelFn, specialization: &Specialization) -> Result<KernelHandle> {
        let group_size = specialization.max_group_size.unwrap_or(64).min(64);
        let handle = self.retain(kernel, group_size)?;
        self.loads.lock().push(LoadRecord::Specialized {
            kernel: kernel.name().to_string(),
            specialization: *specialization,
        });
        Ok(handle)
    }

    fn load_implicitly_grouped_kernel(&self, kernel: &KernelFn, group_size: usize) -> Result<KernelHandle> {
        let handle = self.retain(kernel, group_size)?;
        self.loads.lock().push(LoadRecord::ImplicitlyGrouped {
            kernel: kernel.name().to_string(),
            group_size,
        });
        Ok(handle)
    }

    fn load_auto_grouped_kernel(&self, kernel: &KernelFn) -> Result<(KernelHandle, Occupancy)> {
        let handle = self.retain(kernel, REPORTED_OCCUPANCY.group_size)?;
        self.loads.lock().push(LoadRecord::AutoGrouped {
            kernel: kernel.name().to_string(),
        });
        Ok((handle, REPORTED_OCCUPANCY))
    }

    fn default_stream(&self) -> Stream {
        Stream::new(ACCELERATOR_ID, 0)
    }

    fn create_stream(&self) -> Stream {
        Stream::new(ACCELERATOR_ID, self.next_stream.fetch_add(1, Ordering::SeqCst))
    }

    fn synchronize(&self, _stream: &Stream) -> Result<()> {
        Ok(())
    }

    fn allocate_buffer(&self, _size: usize) -> Result<BufferHandle> {
        Err(AcceleratorError::unsupported("recording accelerator has no memory"))
    }

    fn free_buffer(&self, _handle: BufferHandle) -> Result<()> {
        Err(AcceleratorError::unsupported("recording accelerator has no memory"))
    }

    fn copy_to_buffer(&self, _handle: BufferHandle, _offset: usize, _data: &[u8]) -> Result<()> {
        Err(AcceleratorError::unsupported("recording accelerator has no memory"))
    }

    fn copy_from_buffer(&self, _handle: BufferHandle, _offset: usize, _data: &mut [u8]) -> Result<()> {
        Err(AcceleratorError::unsupported("recording accelerator has no memory"))
    }

    fn buffer_size(&self, _handle: BufferHandle) -> Result<usize> {
        Err(AcceleratorError::unsupported("recording accelerator has no memory"))
    }

    fn buffer_ptr(&self, _handle: BufferHandle) -> Result<NonNull<u8>> {
        Err(AcceleratorError::unsupported("recording accelerator has no memory"))
    }
}
