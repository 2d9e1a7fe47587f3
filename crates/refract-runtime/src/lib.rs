//! # Refract Runtime
//!
//! Accelerator contract and launch vocabulary: the types kernels, streams,
//! and buffers travel through, plus the in-process host accelerator.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │              Accelerator (trait)                │
//! │  load_*_kernel · streams · buffer management    │
//! ├────────────────────────────────────────────────┤
//! │  KernelFn ──load──▶ KernelHandle ──invoke──▶   │
//! │  (stream, Extent, KernelArgs)                   │
//! ├────────────────────────────────────────────────┤
//! │  HostAccelerator: rayon groups × lanes over a   │
//! │  RwLock<MemoryPool> of byte buffers             │
//! └────────────────────────────────────────────────┘
//! ```
//!
//! Kernels are plain function references ([`KernelFn`]) with an erased
//! per-thread entry. Arguments cross the boundary as [`KernelArgs`] packs;
//! typed buffers ([`Buffer`]) hand kernels a raw [`BufferView`] so the
//! launch path performs no lookups.
//!
//! ## Usage
//!
//! ```rust
//! use refract_runtime::{Buffer, HostAccelerator};
//!
//! let accel = HostAccelerator::new();
//! let mut buffer = Buffer::<f32>::allocate(&accel, 16)?;
//! buffer.copy_from_slice(&accel, &[0.5f32; 16])?;
//! assert_eq!(buffer.to_vec(&accel)?[0], 0.5);
//! buffer.free(&accel)?;
//! # Ok::<(), refract_runtime::AcceleratorError>(())
//! ```

pub mod accelerator;
pub mod args;
pub mod buffer;
pub mod error;
pub mod host;
pub mod index;
pub mod kernel;
pub mod stream;
pub mod types;

// Re-export public API
pub use accelerator::{Accelerator, KernelHandle, LoadedKernel};
pub use args::{KernelArg, KernelArgs, KernelParam};
pub use buffer::{Buffer, BufferView};
pub use error::{AcceleratorError, Result};
pub use host::HostAccelerator;
pub use index::{Extent, Index1D, Index2D, Index3D, KernelIndex};
pub use kernel::{KernelEntry, KernelFn};
pub use stream::Stream;
pub use types::{BufferHandle, Occupancy, Specialization};
