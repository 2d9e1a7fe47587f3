//! Accelerator contract
//!
//! The device abstraction kernels are loaded on. The contract splits in two:
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 Accelerator                  │
//! │  identity · kernel loading · streams · memory │
//! └──────────────────────┬──────────────────────┘
//!                        │ load_*_kernel(&KernelFn)
//!                        ▼
//! ┌─────────────────────────────────────────────┐
//! │        KernelHandle (Arc<dyn LoadedKernel>)  │
//! │        invoke(stream, extent, args)          │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Loading compiles a [`KernelFn`] into a retained, shareable handle;
//! invoking the handle executes the whole index space on a stream. All
//! methods take `&self`: implementations synchronize internally so that
//! loaded handles, buffer traffic, and further loads can proceed from
//! borrowing callers concurrently.

use std::fmt;
use std::ptr::NonNull;
use std::sync::Arc;

use crate::args::KernelArgs;
use crate::error::Result;
use crate::index::Extent;
use crate::kernel::KernelFn;
use crate::stream::Stream;
use crate::types::{BufferHandle, Occupancy, Specialization};

/// A kernel compiled and retained by an accelerator
///
/// Implementations hold whatever the device needs to execute the kernel
/// plus the grouping chosen at load time.
pub trait LoadedKernel: Send + Sync {
    /// Kernel name, for diagnostics
    fn kernel_name(&self) -> &str;

    /// Group size chosen at load time
    fn group_size(&self) -> usize;

    /// Execute the kernel over `extent` on `stream`
    ///
    /// # Errors
    ///
    /// Fails on foreign streams, argument pack mismatches, unusable
    /// extents, or execution failures. The arguments are used exactly as
    /// given; no reordering or coercion happens here.
    fn invoke(&self, stream: &Stream, extent: Extent, args: &KernelArgs) -> Result<()>;
}

/// Shared handle to a loaded kernel
///
/// Cheap to clone; the loaded kernel lives until every handle (and every
/// launcher holding one) is dropped.
#[derive(Clone)]
pub struct KernelHandle {
    inner: Arc<dyn LoadedKernel>,
}

impl KernelHandle {
    /// Wrap a loaded kernel
    pub fn new(inner: Arc<dyn LoadedKernel>) -> Self {
        Self { inner }
    }

    /// Kernel name, for diagnostics
    pub fn name(&self) -> &str {
        self.inner.kernel_name()
    }

    /// Group size chosen at load time
    pub fn group_size(&self) -> usize {
        self.inner.group_size()
    }

    /// Execute the kernel over `extent` on `stream`
    ///
    /// # Errors
    ///
    /// Propagates the loaded kernel's failure unmodified.
    pub fn invoke(&self, stream: &Stream, extent: Extent, args: &KernelArgs) -> Result<()> {
        self.inner.invoke(stream, extent, args)
    }
}

impl fmt::Debug for KernelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KernelHandle")
            .field("kernel", &self.name())
            .field("group_size", &self.group_size())
            .finish()
    }
}

/// Device abstraction kernels are loaded on
///
/// Implementations own their streams and buffers and synchronize
/// internally. `id` distinguishes instances so that streams can be checked
/// for affinity at invoke time.
pub trait Accelerator: Send + Sync {
    // ==== Identity ====

    /// Human-readable accelerator name
    fn name(&self) -> &str;

    /// Instance id, unique per accelerator instance in this process
    fn id(&self) -> u64;

    // ==== Kernel Loading ====

    /// Compile `kernel` with default tuning
    ///
    /// # Errors
    /// Fails if the accelerator cannot compile or retain the kernel.
    fn load_kernel(&self, kernel: &KernelFn) -> Result<KernelHandle>;

    /// Compile `kernel` with explicit specialization hints
    ///
    /// # Errors
    /// Fails if the accelerator cannot compile the kernel or rejects the
    /// hints.
    fn load_specialized_kernel(&self, kernel: &KernelFn, specialization: &Specialization) -> Result<KernelHandle>;

    /// Compile `kernel` with a caller-chosen group size
    ///
    /// # Errors
    /// Fails if `group_size` is unusable on this device.
    fn load_implicitly_grouped_kernel(&self, kernel: &KernelFn, group_size: usize) -> Result<KernelHandle>;

    /// Compile `kernel` with occupancy-maximizing grouping
    ///
    /// Returns the handle together with the occupancy estimate the grouping
    /// was derived from.
    ///
    /// # Errors
    /// Fails if the accelerator cannot compile the kernel.
    fn load_auto_grouped_kernel(&self, kernel: &KernelFn) -> Result<(KernelHandle, Occupancy)>;

    // ==== Streams ====

    /// The accelerator's default stream
    fn default_stream(&self) -> Stream;

    /// Create a new independent stream
    fn create_stream(&self) -> Stream;

    /// Block until all work submitted to `stream` has completed
    ///
    /// # Errors
    /// Fails on foreign streams or if queued work failed.
    fn synchronize(&self, stream: &Stream) -> Result<()>;

    // ==== Buffer Management ====

    /// Allocate a zero-initialized buffer of `size` bytes
    ///
    /// # Errors
    /// Fails if the allocation cannot be satisfied.
    fn allocate_buffer(&self, size: usize) -> Result<BufferHandle>;

    /// Free a buffer
    ///
    /// # Errors
    /// Fails if the handle is invalid.
    fn free_buffer(&self, handle: BufferHandle) -> Result<()>;

    /// Copy host bytes into a buffer at `offset`
    ///
    /// # Errors
    /// Fails if the handle is invalid or the range is out of bounds.
    fn copy_to_buffer(&self, handle: BufferHandle, offset: usize, data: &[u8]) -> Result<()>;

    /// Copy bytes out of a buffer at `offset` into `data`
    ///
    /// # Errors
    /// Fails if the handle is invalid or the range is out of bounds.
    fn copy_from_buffer(&self, handle: BufferHandle, offset: usize, data: &mut [u8]) -> Result<()>;

    /// Size of a buffer in bytes
    ///
    /// # Errors
    /// Fails if the handle is invalid.
    fn buffer_size(&self, handle: BufferHandle) -> Result<usize>;

    /// Host-visible base pointer of a buffer
    ///
    /// The pointer stays valid until the buffer is freed; dereferencing it
    /// is only sound while no conflicting access runs. Accelerators without
    /// host-unified memory report `UnsupportedOperation`.
    ///
    /// # Errors
    /// Fails if the handle is invalid or the memory is not host-visible.
    fn buffer_ptr(&self, handle: BufferHandle) -> Result<NonNull<u8>>;
}

// ================================================================================================
// Tests
// ================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingKernel {
        invocations: AtomicUsize,
    }

    impl LoadedKernel for CountingKernel {
        fn kernel_name(&self) -> &str {
            "counting"
        }

        fn group_size(&self) -> usize {
            32
        }

        fn invoke(&self, _stream: &Stream, extent: Extent, _args: &KernelArgs) -> Result<()> {
            self.invocations.fetch_add(extent.total(), Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_handle_delegation() {
        let inner = Arc::new(CountingKernel {
            invocations: AtomicUsize::new(0),
        });
        let handle = KernelHandle::new(inner.clone());

        assert_eq!(handle.name(), "counting");
        assert_eq!(handle.group_size(), 32);

        let stream = Stream::new(0, 0);
        handle.invoke(&stream, Extent::linear(10), &KernelArgs::new()).unwrap();

        let clone = handle.clone();
        clone.invoke(&stream, Extent::linear(5), &KernelArgs::new()).unwrap();
        assert_eq!(inner.invocations.load(Ordering::SeqCst), 15);
    }

    #[test]
    fn test_handle_debug() {
        let handle = KernelHandle::new(Arc::new(CountingKernel {
            invocations: AtomicUsize::new(0),
        }));
        let rendered = format!("{handle:?}");
        assert!(rendered.contains("counting"));
        assert!(rendered.contains("32"));
    }
}
