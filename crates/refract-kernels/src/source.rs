//! Kernel sources
//!
//! A `KernelSource` is the value form of "a kernel to be loaded": it names an
//! index type and a parameter pack and either carries a statically compiled
//! entry point or records why it cannot. Classification happens at
//! construction, where the routine's type is still known; resolution later
//! only reads the recorded outcome.

use std::any;
use std::fmt;
use std::marker::PhantomData;

use refract_runtime::{KernelFn, KernelIndex};

use crate::params::{KernelParams, KernelRoutine};

/// What a source is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SourceBody {
    /// Statically resolvable routine with a compiled entry point
    Forward(KernelFn),

    /// Callable that needs runtime state and has no static entry point
    Indirect { routine_type: &'static str },

    /// Declared source with no routine bound to it
    Unbound,
}

/// A kernel awaiting resolution and loading
///
/// `I` is the index type the routine receives; `P` is its parameter pack.
/// Sources are cheap value types; loading one does not consume it.
pub struct KernelSource<I, P> {
    body: SourceBody,
    _marker: PhantomData<fn(I, P)>,
}

impl<I: KernelIndex, P: KernelParams> KernelSource<I, P> {
    /// Bind a routine to a source
    ///
    /// Zero-sized callables (plain functions, captureless closures) get a
    /// compiled entry point. Anything carrying runtime state, such as a
    /// capturing closure or a function pointer value, is recorded as
    /// indirect and will fail resolution.
    pub fn new<K: KernelRoutine<I, P>>(routine: K) -> Self {
        let body = if std::mem::size_of::<K>() == 0 {
            SourceBody::Forward(KernelFn::new(K::name(), P::ARITY, K::entry()))
        } else {
            SourceBody::Indirect {
                routine_type: any::type_name::<K>(),
            }
        };
        let _ = routine;
        Self {
            body,
            _marker: PhantomData,
        }
    }

    /// Create a source with no routine bound to it
    ///
    /// Resolving an unbound source fails with
    /// [`crate::ResolutionError::NotFound`].
    pub fn unbound() -> Self {
        Self {
            body: SourceBody::Unbound,
            _marker: PhantomData,
        }
    }

    /// Whether this source carries a compiled entry point
    pub fn is_resolvable(&self) -> bool {
        matches!(self.body, SourceBody::Forward(_))
    }

    pub(crate) fn body(&self) -> &SourceBody {
        &self.body
    }
}

impl<I, P> Clone for KernelSource<I, P> {
    fn clone(&self) -> Self {
        Self {
            body: self.body,
            _marker: PhantomData,
        }
    }
}

impl<I, P> Copy for KernelSource<I, P> {}

impl<I, P> fmt::Debug for KernelSource<I, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KernelSource")
            .field("body", &self.body)
            .field("index", &any::type_name::<I>())
            .field("params", &any::type_name::<P>())
            .finish()
    }
}

// ================================================================================================
// Tests
// ================================================================================================
