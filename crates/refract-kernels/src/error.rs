//! Error types for kernel resolution and loading

use refract_runtime::AcceleratorError;

/// Result type for loader operations
pub type LoadResult<T> = std::result::Result<T, LoadError>;

/// Invalid arguments rejected by the loader before it touches the accelerator
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArgumentError {
    /// No kernel source was supplied
    #[error("no kernel source was supplied")]
    MissingKernel,

    /// Group size must be at least one thread
    #[error("invalid group size: {0}")]
    InvalidGroupSize(usize),

    /// Specialization hints are contradictory or degenerate
    #[error("invalid specialization: {0}")]
    InvalidSpecialization(String),
}

/// Failures turning a kernel source into a loadable function reference
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    /// The source was declared but never bound to a routine
    #[error("kernel source is not bound to a routine")]
    NotFound,

    /// The routine carries runtime state and has no static entry point
    #[error("kernel routine `{routine_type}` is not a plain function and cannot be resolved statically")]
    UnsupportedTarget { routine_type: &'static str },
}

/// Any failure of a loader operation
///
/// Accelerator failures pass through transparently; the loader never
/// translates or retries them.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Argument(#[from] ArgumentError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Accelerator(#[from] AcceleratorError),
}

// ================================================================================================
// Tests
// ================================================================================================
