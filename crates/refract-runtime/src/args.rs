//! Erased kernel argument packs
//!
//! Arguments cross the accelerator boundary as an ordered sequence of erased
//! slots. Scalars travel as their native byte image; buffer views travel as
//! an address record, so the launch path performs no accelerator lookups.
//! Slots compare by value, which lets tests assert exact forwarding.

use crate::error::{AcceleratorError, Result};

/// One erased argument slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KernelArg {
    /// POD scalar, stored as its native byte image
    Scalar {
        bytes: Vec<u8>,
        type_name: &'static str,
    },

    /// Buffer view record: base address plus element layout
    View {
        addr: usize,
        len: usize,
        elem_size: usize,
        elem_type: &'static str,
        buffer: u64,
    },
}

impl KernelArg {
    /// Encode a POD scalar
    pub fn scalar<T: bytemuck::Pod>(value: &T) -> Self {
        Self::Scalar {
            bytes: bytemuck::bytes_of(value).to_vec(),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Decode a POD scalar, checking the recorded type name
    pub fn as_scalar<T: bytemuck::Pod>(&self, slot: usize) -> Result<T> {
        match self {
            Self::Scalar { bytes, type_name } => {
                let expected = std::any::type_name::<T>();
                if *type_name != expected {
                    return Err(AcceleratorError::argument_type_mismatch(slot, expected, type_name));
                }
                bytemuck::try_pod_read_unaligned(bytes)
                    .map_err(|e| AcceleratorError::execution_error(format!("argument decode failed at slot {slot}: {e}")))
            }
            Self::View { .. } => Err(AcceleratorError::ArgumentKindMismatch {
                slot,
                expected: "scalar",
            }),
        }
    }

    /// Whether this slot is a buffer view record
    pub const fn is_view(&self) -> bool {
        matches!(self, Self::View { .. })
    }

    /// Type name of the slot's payload (scalar type or view element type)
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Scalar { type_name, .. } => type_name,
            Self::View { elem_type, .. } => elem_type,
        }
    }

    /// Payload size in bytes (scalar image or view span)
    pub fn size_bytes(&self) -> usize {
        match self {
            Self::Scalar { bytes, .. } => bytes.len(),
            Self::View { len, elem_size, .. } => len * elem_size,
        }
    }
}

/// Ordered, erased argument pack for one kernel launch
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KernelArgs {
    slots: Vec<KernelArg>,
}

impl KernelArgs {
    /// Create an empty pack
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty pack with room for `capacity` slots
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
        }
    }

    /// Append a slot
    pub fn push(&mut self, arg: KernelArg) {
        self.slots.push(arg);
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the pack has no slots
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Get a slot by position
    pub fn get(&self, slot: usize) -> Option<&KernelArg> {
        self.slots.get(slot)
    }

    /// Get a slot by position, failing if the pack is too short
    pub fn slot(&self, slot: usize) -> Result<&KernelArg> {
        self.slots
            .get(slot)
            .ok_or_else(|| AcceleratorError::execution_error(format!("missing argument slot {slot}")))
    }

    /// Iterate over slots in argument order
    pub fn iter(&self) -> std::slice::Iter<'_, KernelArg> {
        self.slots.iter()
    }
}

impl FromIterator<KernelArg> for KernelArgs {
    fn from_iter<I: IntoIterator<Item = KernelArg>>(iter: I) -> Self {
        Self {
            slots: iter.into_iter().collect(),
        }
    }
}

/// Typed kernel parameters that can cross the erased boundary
///
/// Implemented for the POD primitives and for buffer views. `slot` is the
/// argument position, used in error messages only.
pub trait KernelParam: Copy + Send + Sync + 'static {
    /// Encode into an erased slot
    fn encode(&self) -> KernelArg;

    /// Decode from an erased slot
    fn decode(arg: &KernelArg, slot: usize) -> Result<Self>;
}

macro_rules! impl_scalar_param {
    ($($ty:ty),* $(,)?) => {
        $(
            impl KernelParam for $ty {
                fn encode(&self) -> KernelArg {
                    KernelArg::scalar(self)
                }

                fn decode(arg: &KernelArg, slot: usize) -> Result<Self> {
                    arg.as_scalar(slot)
                }
            }
        )*
    };
}

impl_scalar_param!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64, usize, isize);

// ================================================================================================
// Tests
// ================================================================================================
