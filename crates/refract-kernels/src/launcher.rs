//! Typed launchers over loaded kernel handles
//!
//! A launcher is what loading produces: a typed front over a
//! [`KernelHandle`] that encodes a parameter tuple and submits it. The
//! stream-parametrized form takes the stream per launch; the bound form
//! carries the accelerator's default stream. Launch failures are the
//! handle's own errors, passed through unmodified.

use std::any;
use std::fmt;
use std::marker::PhantomData;

use refract_runtime::{KernelHandle, KernelIndex, Result, Stream};

use crate::params::KernelParams;

/// Launcher taking an explicit stream per launch
pub struct StreamLauncher<I, P> {
    handle: KernelHandle,
    _marker: PhantomData<fn(I, P)>,
}

impl<I: KernelIndex, P: KernelParams> StreamLauncher<I, P> {
    pub(crate) fn new(handle: KernelHandle) -> Self {
        Self {
            handle,
            _marker: PhantomData,
        }
    }

    /// The loaded kernel behind this launcher
    pub fn handle(&self) -> &KernelHandle {
        &self.handle
    }

    /// Group size chosen when the kernel was loaded
    pub fn group_size(&self) -> usize {
        self.handle.group_size()
    }

    /// Launch over the index space `index` on `stream`
    ///
    /// Encodes `params` in positional order and submits them exactly as
    /// given.
    ///
    /// # Errors
    ///
    /// Propagates the accelerator's invoke failure unmodified.
    pub fn launch(&self, stream: &Stream, index: I, params: P) -> Result<()> {
        let args = params.encode();
        self.handle.invoke(stream, index.extent(), &args)
    }

    /// Bind every future launch to one stream
    pub fn bind(self, stream: Stream) -> Launcher<I, P> {
        Launcher { inner: self, stream }
    }
}

impl<I, P> Clone for StreamLauncher<I, P> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
            _marker: PhantomData,
        }
    }
}

impl<I, P> fmt::Debug for StreamLauncher<I, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamLauncher")
            .field("kernel", &self.handle.name())
            .field("index", &any::type_name::<I>())
            .field("params", &any::type_name::<P>())
            .finish()
    }
}

/// Launcher bound to its accelerator's default stream
pub struct Launcher<I, P> {
    inner: StreamLauncher<I, P>,
    stream: Stream,
}

impl<I: KernelIndex, P: KernelParams> Launcher<I, P> {
    /// The loaded kernel behind this launcher
    pub fn handle(&self) -> &KernelHandle {
        self.inner.handle()
    }

    /// The stream every launch goes to
    pub fn stream(&self) -> Stream {
        self.stream
    }

    /// Group size chosen when the kernel was loaded
    pub fn group_size(&self) -> usize {
        self.inner.group_size()
    }

    /// Launch over the index space `index` on the bound stream
    ///
    /// # Errors
    ///
    /// Propagates the accelerator's invoke failure unmodified.
    pub fn launch(&self, index: I, params: P) -> Result<()> {
        self.inner.launch(&self.stream, index, params)
    }
}

impl<I, P> Clone for Launcher<I, P> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            stream: self.stream,
        }
    }
}

impl<I, P> fmt::Debug for Launcher<I, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Launcher")
            .field("kernel", &self.inner.handle.name())
            .field("stream", &self.stream)
            .field("index", &any::type_name::<I>())
            .field("params", &any::type_name::<P>())
            .finish()
    }
}

// ================================================================================================
// Tests
// ================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use refract_runtime::{
        AcceleratorError, Extent, Index1D, Index2D, KernelArgs, LoadedKernel,
    };
    use std::sync::Arc;

    #[derive(Default)]
    struct RecordingKernel {
        calls: Mutex<Vec<(Stream, Extent, KernelArgs)>>,
        fail: bool,
    }

    impl LoadedKernel for RecordingKernel {
        fn kernel_name(&self) -> &str {
            "recording"
        }

        fn group_size(&self) -> usize {
            64
        }

        fn invoke(&self, stream: &Stream, extent: Extent, args: &KernelArgs) -> Result<()> {
            self.calls.lock().push((*stream, extent, args.clone()));
            if self.fail {
                return Err(AcceleratorError::execution_error("injected invoke failure"));
            }
            Ok(())
        }
    }

    #[test]
    fn test_stream_launcher_forwards_exactly() {
        let kernel = Arc::new(RecordingKernel::default());
        let launcher = StreamLauncher::<Index1D, (i32, f32)>::new(KernelHandle::new(kernel.clone()));

        let stream = Stream::new(2, 5);
        launcher.launch(&stream, Index1D::new(8), (3, 1.5)).unwrap();

        let calls = kernel.calls.lock();
        assert_eq!(calls.len(), 1);
        let (got_stream, got_extent, got_args) = &calls[0];
        assert_eq!(*got_stream, stream);
        assert_eq!(*got_extent, Extent::linear(8));
        assert_eq!(*got_args, (3i32, 1.5f32).encode());
    }

    #[test]
    fn test_bound_launcher_uses_its_stream() {
        let kernel = Arc::new(RecordingKernel::default());
        let stream = Stream::new(1, 0);
        let launcher = StreamLauncher::<Index2D, (u8,)>::new(KernelHandle::new(kernel.clone())).bind(stream);
        assert_eq!(launcher.stream(), stream);

        launcher.launch(Index2D::new(4, 2), (9,)).unwrap();

        let calls = kernel.calls.lock();
        assert_eq!(calls[0].0, stream);
        assert_eq!(calls[0].1, Extent::planar(4, 2));
    }

    #[test]
    fn test_failure_passes_through() {
        let kernel = Arc::new(RecordingKernel {
            fail: true,
            ..RecordingKernel::default()
        });
        let launcher = StreamLauncher::<Index1D, (i32,)>::new(KernelHandle::new(kernel));

        let err = launcher.launch(&Stream::new(0, 0), Index1D::new(1), (0,)).unwrap_err();
        assert_eq!(err.to_string(), "execution error: injected invoke failure");
    }

    #[test]
    fn test_clone_shares_handle() {
        let kernel = Arc::new(RecordingKernel::default());
        let launcher = StreamLauncher::<Index1D, (i32,)>::new(KernelHandle::new(kernel.clone()));
        let clone = launcher.clone();

        let stream = Stream::new(0, 0);
        launcher.launch(&stream, Index1D::new(1), (1,)).unwrap();
        clone.launch(&stream, Index1D::new(1), (2,)).unwrap();
        assert_eq!(kernel.calls.lock().len(), 2);
        assert_eq!(launcher.group_size(), 64);
    }
}
