//! Handles and tuning records shared across the accelerator boundary

use std::fmt;

/// Handle to an allocated buffer
///
/// Buffers are opaque handles managed by the accelerator.
/// Use Accelerator methods to interact with buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u64);

impl BufferHandle {
    /// Create a new buffer handle
    pub const fn new(id: u64) -> Self {
        BufferHandle(id)
    }

    /// Get the internal ID
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BufferHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "buf{}", self.0)
    }
}

/// Occupancy estimate reported by an accelerator's auto-grouping query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Occupancy {
    /// Recommended group size for maximum utilization
    pub group_size: usize,

    /// Minimum grid size at which the device is fully utilized
    pub min_grid_size: usize,
}

impl Occupancy {
    /// Create a new occupancy record
    pub const fn new(group_size: usize, min_grid_size: usize) -> Self {
        Self {
            group_size,
            min_grid_size,
        }
    }
}

impl fmt::Display for Occupancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group_size={}, min_grid_size={}", self.group_size, self.min_grid_size)
    }
}

/// Compile-time tuning hints for kernel loading
///
/// Every field is optional; an accelerator applies the hints it understands
/// and ignores the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Specialization {
    /// Upper bound on the group size chosen for the kernel
    pub max_group_size: Option<usize>,

    /// Lower bound on resident groups per processor
    pub min_groups_per_processor: Option<usize>,
}

impl Specialization {
    /// Create an empty specialization (no hints)
    pub const fn none() -> Self {
        Self {
            max_group_size: None,
            min_groups_per_processor: None,
        }
    }

    /// Set the maximum group size hint
    pub const fn with_max_group_size(mut self, size: usize) -> Self {
        self.max_group_size = Some(size);
        self
    }

    /// Set the minimum groups-per-processor hint
    pub const fn with_min_groups_per_processor(mut self, groups: usize) -> Self {
        self.min_groups_per_processor = Some(groups);
        self
    }

    /// Whether no hints are set
    pub const fn is_none(&self) -> bool {
        self.max_group_size.is_none() && self.min_groups_per_processor.is_none()
    }
}

impl fmt::Display for Specialization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.max_group_size, self.min_groups_per_processor) {
            (None, None) => write!(f, "none"),
            (Some(g), None) => write!(f, "max_group_size={g}"),
            (None, Some(p)) => write!(f, "min_groups_per_processor={p}"),
            (Some(g), Some(p)) => write!(f, "max_group_size={g}, min_groups_per_processor={p}"),
        }
    }
}

// ================================================================================================
// Tests
// ================================================================================================
