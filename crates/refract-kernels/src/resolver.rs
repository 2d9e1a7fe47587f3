//! Source resolution
//!
//! Resolution turns a [`KernelSource`] into the flat [`KernelFn`]
//! accelerators load. It is a pure read of the classification made at
//! source construction; nothing is cached, so resolving twice is exactly
//! two reads.

use refract_runtime::{KernelFn, KernelIndex};

use crate::error::ResolutionError;
use crate::params::KernelParams;
use crate::source::{KernelSource, SourceBody};

/// Resolve a source to its statically compiled function reference
///
/// # Errors
///
/// Returns [`ResolutionError::NotFound`] for an unbound source, and
/// [`ResolutionError::UnsupportedTarget`] for a routine that needs runtime
/// state (a capturing closure or a function pointer value).
pub fn resolve<I: KernelIndex, P: KernelParams>(
    source: &KernelSource<I, P>,
) -> Result<KernelFn, ResolutionError> {
    match *source.body() {
        SourceBody::Forward(kernel) => Ok(kernel),
        SourceBody::Indirect { routine_type } => Err(ResolutionError::UnsupportedTarget { routine_type }),
        SourceBody::Unbound => Err(ResolutionError::NotFound),
    }
}

// ================================================================================================
// Tests
// ================================================================================================
