//! Error types for accelerator operations

use std::fmt;

/// Result type for accelerator operations
pub type Result<T> = std::result::Result<T, AcceleratorError>;

/// Errors that can occur inside an accelerator implementation
#[derive(Debug, thiserror::Error)]
pub enum AcceleratorError {
    /// Invalid buffer handle
    #[error("invalid buffer handle: {0}")]
    InvalidBufferHandle(u64),

    /// Buffer access out of bounds
    #[error("buffer access out of bounds: offset {offset} + size {size} > buffer size {buffer_size}")]
    BufferOutOfBounds {
        offset: usize,
        size: usize,
        buffer_size: usize,
    },

    /// Host/device size mismatch on a typed copy
    #[error("buffer size mismatch: expected {expected} elements, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// Argument pack length does not match the kernel arity
    #[error("argument count mismatch: kernel {kernel} takes {expected} parameters, got {actual}")]
    ArgumentCountMismatch {
        kernel: String,
        expected: usize,
        actual: usize,
    },

    /// Argument slot holds a different type than the kernel expects
    #[error("argument type mismatch at slot {slot}: expected {expected}, got {actual}")]
    ArgumentTypeMismatch {
        slot: usize,
        expected: String,
        actual: String,
    },

    /// Argument slot holds a scalar where a view was expected, or vice versa
    #[error("argument kind mismatch at slot {slot}: expected {expected}")]
    ArgumentKindMismatch { slot: usize, expected: &'static str },

    /// Launch extent or grouping is unusable
    #[error("invalid launch configuration: {0}")]
    InvalidLaunchConfig(String),

    /// Stream belongs to a different accelerator instance
    #[error("foreign stream: stream {stream} belongs to accelerator {owner}, not accelerator {actual}")]
    ForeignStream { stream: u64, owner: u64, actual: u64 },

    /// Operation not supported by this accelerator
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Kernel execution failure
    #[error("execution error: {0}")]
    ExecutionError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl AcceleratorError {
    /// Create an argument type mismatch error
    pub fn argument_type_mismatch(slot: usize, expected: impl fmt::Display, actual: impl fmt::Display) -> Self {
        Self::ArgumentTypeMismatch {
            slot,
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create an invalid launch configuration error
    pub fn invalid_launch(msg: impl Into<String>) -> Self {
        Self::InvalidLaunchConfig(msg.into())
    }

    /// Create an unsupported operation error
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedOperation(msg.into())
    }

    /// Create an execution error
    pub fn execution_error(msg: impl Into<String>) -> Self {
        Self::ExecutionError(msg.into())
    }
}
