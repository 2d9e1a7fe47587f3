//! Execution streams
//!
//! A stream is an ordered execution queue bound to one accelerator
//! instance. Streams are identity values: cloning yields another handle to
//! the same queue, and equality is by identity. Work submitted to one
//! stream completes in submission order; ordering across streams is the
//! accelerator's business.

use std::fmt;

/// Handle to an ordered execution queue on one accelerator instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Stream {
    accelerator: u64,
    id: u64,
}

impl Stream {
    /// Create a stream handle
    ///
    /// Called by accelerator implementations; `accelerator` is the owning
    /// instance id.
    pub const fn new(accelerator: u64, id: u64) -> Self {
        Self { accelerator, id }
    }

    /// Stream id, unique within the owning accelerator
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Owning accelerator instance id
    pub const fn accelerator_id(&self) -> u64 {
        self.accelerator
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stream{}@acc{}", self.id, self.accelerator)
    }
}

// ================================================================================================
// Tests
// ================================================================================================
