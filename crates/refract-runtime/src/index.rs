//! Launch index spaces and extents
//!
//! Index types serve double duty: the launch site passes one as the size of
//! the index space, and each kernel thread receives one describing its own
//! position. `Extent` is the erased 3-D form that crosses the accelerator
//! boundary.

use std::fmt;

/// Erased 3-D size of a launch index space
///
/// Each field is the thread count along that axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Extent {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl Extent {
    /// Create a new extent
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    /// Create a 1-D extent
    pub const fn linear(size: usize) -> Self {
        Self { x: size, y: 1, z: 1 }
    }

    /// Create a 2-D extent
    pub const fn planar(x: usize, y: usize) -> Self {
        Self { x, y, z: 1 }
    }

    /// Total number of threads in the index space
    pub const fn total(&self) -> usize {
        self.x * self.y * self.z
    }

    /// Whether the index space contains no threads
    pub const fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Decompose a linear thread offset into 3-D coordinates, x fastest.
    ///
    /// The extent must be non-empty and `linear` must be below `total()`.
    pub const fn coords_of(&self, linear: usize) -> [usize; 3] {
        let x = linear % self.x;
        let y = (linear / self.x) % self.y;
        let z = linear / (self.x * self.y);
        [x, y, z]
    }
}

impl Default for Extent {
    fn default() -> Self {
        Self { x: 1, y: 1, z: 1 }
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Types usable both as a launch extent and as a per-thread index
///
/// The launch site interprets the value as the size of the index space; the
/// kernel body receives one value per thread, rebuilt from that thread's
/// coordinates.
pub trait KernelIndex: Copy + Send + Sync + PartialEq + fmt::Debug + 'static {
    /// Number of significant dimensions
    const DIMENSIONS: usize;

    /// Interpret this value as the size of a launch index space
    fn extent(&self) -> Extent;

    /// Rebuild the per-thread index from 3-D thread coordinates
    fn from_coords(coords: [usize; 3]) -> Self;
}

/// One-dimensional index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Index1D(pub usize);

impl Index1D {
    /// Create a new 1-D index
    pub const fn new(x: usize) -> Self {
        Index1D(x)
    }

    /// Position (or size) along x
    pub const fn x(self) -> usize {
        self.0
    }
}

impl KernelIndex for Index1D {
    const DIMENSIONS: usize = 1;

    fn extent(&self) -> Extent {
        Extent::linear(self.0)
    }

    fn from_coords(coords: [usize; 3]) -> Self {
        Index1D(coords[0])
    }
}

impl From<usize> for Index1D {
    fn from(x: usize) -> Self {
        Index1D(x)
    }
}

impl fmt::Display for Index1D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Two-dimensional index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Index2D {
    pub x: usize,
    pub y: usize,
}

impl Index2D {
    /// Create a new 2-D index
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl KernelIndex for Index2D {
    const DIMENSIONS: usize = 2;

    fn extent(&self) -> Extent {
        Extent::planar(self.x, self.y)
    }

    fn from_coords(coords: [usize; 3]) -> Self {
        Self {
            x: coords[0],
            y: coords[1],
        }
    }
}

impl From<(usize, usize)> for Index2D {
    fn from((x, y): (usize, usize)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Index2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Three-dimensional index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Index3D {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl Index3D {
    /// Create a new 3-D index
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }
}

impl KernelIndex for Index3D {
    const DIMENSIONS: usize = 3;

    fn extent(&self) -> Extent {
        Extent::new(self.x, self.y, self.z)
    }

    fn from_coords(coords: [usize; 3]) -> Self {
        Self {
            x: coords[0],
            y: coords[1],
            z: coords[2],
        }
    }
}

impl From<(usize, usize, usize)> for Index3D {
    fn from((x, y, z): (usize, usize, usize)) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for Index3D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

// ================================================================================================
// Tests
// ================================================================================================
