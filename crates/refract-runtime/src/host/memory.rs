//! Buffer storage for the host accelerator

use std::collections::HashMap;
use std::ptr::NonNull;

use crate::error::{AcceleratorError, Result};
use crate::types::BufferHandle;

/// Owns every host allocation behind sequential ids
///
/// Allocations are fixed-size byte vectors that never grow, so base
/// pointers handed out by `base_ptr` stay stable until the buffer is
/// freed, including across later allocations.
#[derive(Debug)]
pub(crate) struct MemoryPool {
    buffers: HashMap<u64, Vec<u8>>,
    next_id: u64,
}

impl MemoryPool {
    /// Create an empty pool
    pub fn new() -> Self {
        Self {
            buffers: HashMap::new(),
            next_id: 1,
        }
    }

    /// Allocate a zero-initialized buffer of `size` bytes
    pub fn allocate(&mut self, size: usize) -> BufferHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.buffers.insert(id, vec![0u8; size]);
        BufferHandle::new(id)
    }

    /// Free a buffer
    pub fn free(&mut self, handle: BufferHandle) -> Result<()> {
        self.buffers
            .remove(&handle.id())
            .map(|_| ())
            .ok_or(AcceleratorError::InvalidBufferHandle(handle.id()))
    }

    /// Copy host bytes into a buffer at `offset`
    pub fn copy_to(&mut self, handle: BufferHandle, offset: usize, data: &[u8]) -> Result<()> {
        let buffer = self
            .buffers
            .get_mut(&handle.id())
            .ok_or(AcceleratorError::InvalidBufferHandle(handle.id()))?;

        if offset + data.len() > buffer.len() {
            return Err(AcceleratorError::BufferOutOfBounds {
                offset,
                size: data.len(),
                buffer_size: buffer.len(),
            });
        }

        buffer[offset..offset + data.len()].copy_from_slice(data);
        Ok(())
    }

    /// Copy bytes out of a buffer at `offset` into `data`
    pub fn copy_from(&self, handle: BufferHandle, offset: usize, data: &mut [u8]) -> Result<()> {
        let buffer = self
            .buffers
            .get(&handle.id())
            .ok_or(AcceleratorError::InvalidBufferHandle(handle.id()))?;

        if offset + data.len() > buffer.len() {
            return Err(AcceleratorError::BufferOutOfBounds {
                offset,
                size: data.len(),
                buffer_size: buffer.len(),
            });
        }

        data.copy_from_slice(&buffer[offset..offset + data.len()]);
        Ok(())
    }

    /// Buffer size in bytes
    pub fn size(&self, handle: BufferHandle) -> Result<usize> {
        self.buffers
            .get(&handle.id())
            .map(Vec::len)
            .ok_or(AcceleratorError::InvalidBufferHandle(handle.id()))
    }

    /// Stable base pointer of a buffer
    ///
    /// Valid until the buffer is freed. Dereferencing is only sound while
    /// no conflicting host copy runs on the same range.
    pub fn base_ptr(&self, handle: BufferHandle) -> Result<NonNull<u8>> {
        let buffer = self
            .buffers
            .get(&handle.id())
            .ok_or(AcceleratorError::InvalidBufferHandle(handle.id()))?;

        // Vec::as_ptr is non-null even for zero-length allocations
        NonNull::new(buffer.as_ptr() as *mut u8)
            .ok_or_else(|| AcceleratorError::execution_error("null buffer base pointer"))
    }
}

impl Default for MemoryPool {
    fn default() -> Self {
        Self::new()
    }
}

// ================================================================================================
// Tests
// ================================================================================================
