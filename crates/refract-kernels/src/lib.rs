//! Typed, function-valued kernel loading over the accelerator runtime.
//!
//! Accelerators load flat function references and launch them with erased
//! argument packs. Kernel authors write ordinary Rust functions over a typed
//! index and typed parameters. This crate is the adapter between the two:
//!
//! ```text
//! fn(index, p1, .., pN)        typed routine, written by the kernel author
//!         │
//!         ▼  KernelSource::new          classify at construction
//! KernelSource<I, P>
//!         │
//!         ▼  resolver::resolve          reject stateful callables
//! KernelFn                              flat, loadable reference
//!         │
//!         ▼  KernelLoader::load_*       one accelerator load per call
//! StreamLauncher<I, P> / Launcher<I, P>
//!         │
//!         ▼  launch(stream, index, (p1, .., pN))
//! KernelHandle::invoke(stream, extent, args)
//! ```
//!
//! Only zero-sized callables (plain functions and captureless closures) can
//! be loaded; anything carrying runtime state fails resolution with
//! [`ResolutionError::UnsupportedTarget`]. Loading is deliberately
//! uncached, and accelerator failures pass through unmodified.
//!
//! # Example
//!
//! ```
//! use refract_kernels::KernelLoader;
//! use refract_runtime::{Accelerator, Buffer, BufferView, HostAccelerator, Index1D};
//!
//! fn fill(index: Index1D, out: BufferView<i32>, offset: i32) {
//!     out.store(index.x(), index.x() as i32 + offset);
//! }
//!
//! let accelerator = HostAccelerator::new();
//! let loader = KernelLoader::new(&accelerator);
//! let launcher = loader.load_auto_grouped_stream_kernel(fill)?;
//!
//! let buffer = Buffer::<i32>::allocate(&accelerator, 16)?;
//! let stream = accelerator.default_stream();
//! launcher.launch(&stream, Index1D::new(16), (buffer.view(), 5))?;
//! accelerator.synchronize(&stream)?;
//!
//! assert_eq!(buffer.to_vec(&accelerator)?[3], 8);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod launcher;
pub mod loader;
pub mod params;
pub mod resolver;
pub mod source;

pub use error::{ArgumentError, LoadError, LoadResult, ResolutionError};
pub use launcher::{Launcher, StreamLauncher};
pub use loader::{KernelLoader, Tuning};
pub use params::{KernelParams, KernelRoutine};
pub use resolver::resolve;
pub use source::KernelSource;
