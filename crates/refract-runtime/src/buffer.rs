//! Typed buffers over accelerator memory
//!
//! `Buffer<T>` owns an allocation made through an [`Accelerator`] and
//! carries the host-transfer operations. `BufferView<T>` is the `Copy`
//! record a kernel receives: a raw base address plus element count with
//! bounds-checked element access. Buffers are caller-managed; nothing is
//! freed on drop.

use std::any;
use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;
use std::time::Instant;

use refract_tracing::performance::{record_allocation, record_transfer};

use crate::accelerator::Accelerator;
use crate::args::{KernelArg, KernelParam};
use crate::error::{AcceleratorError, Result};
use crate::types::BufferHandle;

/// Typed buffer residing in accelerator memory
pub struct Buffer<T> {
    handle: BufferHandle,
    len: usize,
    base: NonNull<u8>,
    _marker: PhantomData<T>,
}

// The base pointer aliases accelerator memory; access goes through the
// accelerator's synchronized methods or through views under the caller's
// stream discipline.
unsafe impl<T: Send> Send for Buffer<T> {}
unsafe impl<T: Sync> Sync for Buffer<T> {}

impl<T: bytemuck::Pod> Buffer<T> {
    /// Allocate a zero-initialized buffer of `len` elements
    ///
    /// # Errors
    /// Fails if the accelerator cannot satisfy the allocation or does not
    /// expose host-visible memory.
    #[tracing::instrument(skip(accelerator), fields(elements = len, type_name = any::type_name::<T>()))]
    pub fn allocate<A: Accelerator + ?Sized>(accelerator: &A, len: usize) -> Result<Self> {
        let bytes = len * std::mem::size_of::<T>();
        let start = Instant::now();
        let handle = accelerator.allocate_buffer(bytes)?;
        let base = accelerator.buffer_ptr(handle)?;
        record_allocation(bytes, accelerator.name(), start.elapsed().as_micros() as u64);
        tracing::trace!(%handle, "buffer_allocated");
        Ok(Self {
            handle,
            len,
            base,
            _marker: PhantomData,
        })
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the buffer holds no elements
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Size in bytes
    pub fn size_bytes(&self) -> usize {
        self.len * std::mem::size_of::<T>()
    }

    /// Underlying accelerator handle
    pub fn handle(&self) -> BufferHandle {
        self.handle
    }

    /// View of the whole buffer, as passed to kernels
    pub fn view(&self) -> BufferView<T> {
        BufferView {
            base: self.base,
            len: self.len,
            handle: self.handle,
            _marker: PhantomData,
        }
    }

    /// Copy `src` into the buffer (host to accelerator)
    ///
    /// # Errors
    /// Fails if `src.len()` differs from the buffer length.
    #[tracing::instrument(skip(self, accelerator, src), fields(elements = src.len(), bytes = std::mem::size_of_val(src), type_name = any::type_name::<T>()))]
    pub fn copy_from_slice<A: Accelerator + ?Sized>(&mut self, accelerator: &A, src: &[T]) -> Result<()> {
        if src.len() != self.len {
            return Err(AcceleratorError::BufferSizeMismatch {
                expected: self.len,
                actual: src.len(),
            });
        }

        let start = Instant::now();
        accelerator.copy_to_buffer(self.handle, 0, bytemuck::cast_slice(src))?;
        record_transfer(std::mem::size_of_val(src), "H2D", start.elapsed().as_micros() as u64);
        Ok(())
    }

    /// Copy the buffer into `dst` (accelerator to host)
    ///
    /// # Errors
    /// Fails if `dst.len()` differs from the buffer length.
    #[tracing::instrument(skip(self, accelerator, dst), fields(elements = dst.len(), bytes = std::mem::size_of_val(dst), type_name = any::type_name::<T>()))]
    pub fn copy_to_slice<A: Accelerator + ?Sized>(&self, accelerator: &A, dst: &mut [T]) -> Result<()> {
        if dst.len() != self.len {
            return Err(AcceleratorError::BufferSizeMismatch {
                expected: self.len,
                actual: dst.len(),
            });
        }

        let start = Instant::now();
        accelerator.copy_from_buffer(self.handle, 0, bytemuck::cast_slice_mut(dst))?;
        record_transfer(std::mem::size_of_val(dst), "D2H", start.elapsed().as_micros() as u64);
        Ok(())
    }

    /// Copy the buffer into a fresh `Vec`
    ///
    /// # Errors
    /// Fails if the accelerator copy fails.
    pub fn to_vec<A: Accelerator + ?Sized>(&self, accelerator: &A) -> Result<Vec<T>> {
        let mut out = vec![T::zeroed(); self.len];
        self.copy_to_slice(accelerator, &mut out)?;
        Ok(out)
    }

    /// Release the allocation
    ///
    /// Consumes the buffer; outstanding views and clones become dangling.
    ///
    /// # Errors
    /// Fails if the handle is no longer valid.
    pub fn free<A: Accelerator + ?Sized>(self, accelerator: &A) -> Result<()> {
        accelerator.free_buffer(self.handle)
    }
}

/// Clones alias the same allocation; freeing through one clone invalidates
/// the others.
impl<T> Clone for Buffer<T> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle,
            len: self.len,
            base: self.base,
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Buffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("handle", &self.handle)
            .field("len", &self.len)
            .field("type", &any::type_name::<T>())
            .finish()
    }
}

/// Borrow-free view of a buffer, as received by kernel bodies
///
/// Views are plain records (address, length, handle); copying one does not
/// copy data. Element access is bounds-checked; an out-of-range index
/// aborts the launch with a panic, the host rendition of a device trap.
pub struct BufferView<T> {
    base: NonNull<u8>,
    len: usize,
    handle: BufferHandle,
    _marker: PhantomData<T>,
}

unsafe impl<T: Send> Send for BufferView<T> {}
unsafe impl<T: Sync> Sync for BufferView<T> {}

impl<T> Clone for BufferView<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for BufferView<T> {}

impl<T: bytemuck::Pod> BufferView<T> {
    /// Number of elements
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the view spans no elements
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Handle of the viewed buffer
    pub fn handle(&self) -> BufferHandle {
        self.handle
    }

    /// Read element `index`
    ///
    /// Panics if `index` is out of range.
    pub fn load(&self, index: usize) -> T {
        assert!(index < self.len, "view load out of range: index {index} >= len {}", self.len);
        // Buffer storage is byte-aligned, so element access must not assume
        // T's alignment.
        unsafe { (self.base.as_ptr() as *const T).add(index).read_unaligned() }
    }

    /// Write element `index`
    ///
    /// Panics if `index` is out of range.
    pub fn store(&self, index: usize, value: T) {
        assert!(index < self.len, "view store out of range: index {index} >= len {}", self.len);
        unsafe { (self.base.as_ptr() as *mut T).add(index).write_unaligned(value) }
    }
}

impl<T> fmt::Debug for BufferView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferView")
            .field("handle", &self.handle)
            .field("len", &self.len)
            .field("type", &any::type_name::<T>())
            .finish()
    }
}

impl<T: bytemuck::Pod + Send + Sync> KernelParam for BufferView<T> {
    fn encode(&self) -> KernelArg {
        KernelArg::View {
            addr: self.base.as_ptr() as usize,
            len: self.len,
            elem_size: std::mem::size_of::<T>(),
            elem_type: any::type_name::<T>(),
            buffer: self.handle.id(),
        }
    }

    fn decode(arg: &KernelArg, slot: usize) -> Result<Self> {
        match arg {
            KernelArg::View {
                addr,
                len,
                elem_size,
                elem_type,
                buffer,
            } => {
                let expected = any::type_name::<T>();
                if *elem_type != expected || *elem_size != std::mem::size_of::<T>() {
                    return Err(AcceleratorError::argument_type_mismatch(slot, expected, elem_type));
                }
                let base = NonNull::new(*addr as *mut u8)
                    .ok_or_else(|| AcceleratorError::execution_error(format!("null view address at slot {slot}")))?;
                Ok(Self {
                    base,
                    len: *len,
                    handle: BufferHandle::new(*buffer),
                    _marker: PhantomData,
                })
            }
            KernelArg::Scalar { .. } => Err(AcceleratorError::ArgumentKindMismatch {
                slot,
                expected: "view",
            }),
        }
    }
}

// ================================================================================================
// Tests
// ================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HostAccelerator;

    #[test]
    fn test_allocate_and_roundtrip() {
        let accel = HostAccelerator::new();
        let mut buffer = Buffer::<i32>::allocate(&accel, 16).unwrap();
        assert_eq!(buffer.len(), 16);
        assert_eq!(buffer.size_bytes(), 64);

        // Fresh buffers read back as zeros
        assert_eq!(buffer.to_vec(&accel).unwrap(), vec![0i32; 16]);

        let data: Vec<i32> = (0..16).collect();
        buffer.copy_from_slice(&accel, &data).unwrap();
        assert_eq!(buffer.to_vec(&accel).unwrap(), data);

        buffer.free(&accel).unwrap();
    }

    #[test]
    fn test_size_mismatch() {
        let accel = HostAccelerator::new();
        let mut buffer = Buffer::<f32>::allocate(&accel, 8).unwrap();

        let err = buffer.copy_from_slice(&accel, &[1.0f32; 4]).unwrap_err();
        assert!(matches!(
            err,
            AcceleratorError::BufferSizeMismatch { expected: 8, actual: 4 }
        ));

        let mut small = [0.0f32; 2];
        let err = buffer.copy_to_slice(&accel, &mut small).unwrap_err();
        assert!(matches!(
            err,
            AcceleratorError::BufferSizeMismatch { expected: 8, actual: 2 }
        ));
    }

    #[test]
    fn test_view_load_store() {
        let accel = HostAccelerator::new();
        let buffer = Buffer::<u64>::allocate(&accel, 4).unwrap();
        let view = buffer.view();

        view.store(2, 99);
        assert_eq!(view.load(2), 99);
        assert_eq!(buffer.to_vec(&accel).unwrap(), vec![0, 0, 99, 0]);
    }

    #[test]
    #[should_panic(expected = "view store out of range")]
    fn test_view_out_of_range() {
        let accel = HostAccelerator::new();
        let buffer = Buffer::<u8>::allocate(&accel, 4).unwrap();
        buffer.view().store(4, 1);
    }

    #[test]
    fn test_view_param_roundtrip() {
        let accel = HostAccelerator::new();
        let buffer = Buffer::<i32>::allocate(&accel, 8).unwrap();
        let view = buffer.view();

        let arg = view.encode();
        assert!(arg.is_view());

        let decoded = BufferView::<i32>::decode(&arg, 0).unwrap();
        assert_eq!(decoded.len(), 8);
        assert_eq!(decoded.handle(), buffer.handle());

        // Decoded views alias the original storage
        decoded.store(1, -7);
        assert_eq!(view.load(1), -7);
    }

    #[test]
    fn test_view_param_type_check() {
        let accel = HostAccelerator::new();
        let buffer = Buffer::<i32>::allocate(&accel, 8).unwrap();
        let arg = buffer.view().encode();

        let err = BufferView::<f32>::decode(&arg, 1).unwrap_err();
        assert!(matches!(err, AcceleratorError::ArgumentTypeMismatch { slot: 1, .. }));
    }
}
