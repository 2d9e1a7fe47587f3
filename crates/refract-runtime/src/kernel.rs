//! Kernel function references
//!
//! A `KernelFn` is the flat form of a kernel that accelerators load: a name,
//! a parameter count, and an erased per-thread entry point. The entry is
//! called once per thread with that thread's coordinates and the launch's
//! argument pack.

use std::fmt;

use crate::args::KernelArgs;
use crate::error::Result;

/// Erased per-thread entry point of a kernel
pub type KernelEntry = fn([usize; 3], &KernelArgs) -> Result<()>;

/// Resolved kernel function reference
///
/// The unit accelerators load. `name` is the type path of the originating
/// function; `arity` counts the kernel's parameters after the index.
#[derive(Clone, Copy)]
pub struct KernelFn {
    name: &'static str,
    arity: usize,
    entry: KernelEntry,
}

impl KernelFn {
    /// Create a new kernel function reference
    pub const fn new(name: &'static str, arity: usize, entry: KernelEntry) -> Self {
        Self { name, arity, entry }
    }

    /// Kernel name
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Number of kernel parameters after the index
    pub const fn arity(&self) -> usize {
        self.arity
    }

    /// Execute the kernel body for one thread
    pub fn run_thread(&self, coords: [usize; 3], args: &KernelArgs) -> Result<()> {
        (self.entry)(coords, args)
    }
}

impl PartialEq for KernelFn {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.arity == other.arity && self.entry as usize == other.entry as usize
    }
}

impl Eq for KernelFn {}

impl fmt::Debug for KernelFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KernelFn")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .field("entry", &(self.entry as *const ()))
            .finish()
    }
}

impl fmt::Display for KernelFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

// ================================================================================================
// Tests
// ================================================================================================
