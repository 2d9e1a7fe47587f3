//! Kernel loader front-end
//!
//! `KernelLoader` is the API surface that takes typed kernel routines to
//! launchers on one accelerator. Every operation follows the same path:
//! validate the caller's arguments, resolve the routine to a flat function
//! reference, hand that reference to the accelerator, and wrap the returned
//! handle in a typed launcher. Nothing is cached and nothing is retried:
//! loading the same routine twice performs two resolutions and two
//! accelerator loads, and every accelerator failure surfaces unmodified.
//!
//! Operations come in pairs, one returning a [`StreamLauncher`] and one
//! returning a default-stream [`Launcher`], crossed with the tuning modes
//! the accelerator contract offers. The `*_from_source` pair covers callers
//! that build [`KernelSource`] values programmatically and pick the tuning
//! at runtime.

use refract_runtime::{Accelerator, KernelHandle, KernelIndex, Occupancy, Specialization};

use crate::error::{ArgumentError, LoadResult};
use crate::launcher::{Launcher, StreamLauncher};
use crate::params::{KernelParams, KernelRoutine};
use crate::resolver::resolve;
use crate::source::KernelSource;

/// Tuning mode for a source-driven load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tuning {
    /// Accelerator-default grouping
    #[default]
    Default,

    /// Explicit specialization hints
    Specialized(Specialization),

    /// Caller-chosen group size
    ImplicitlyGrouped(usize),

    /// Occupancy-maximizing grouping chosen by the accelerator
    AutoGrouped,
}

impl Tuning {
    fn validate(&self) -> Result<(), ArgumentError> {
        match self {
            Tuning::Default | Tuning::AutoGrouped => Ok(()),
            Tuning::Specialized(specialization) => check_specialization(specialization),
            Tuning::ImplicitlyGrouped(group_size) => check_group_size(*group_size),
        }
    }
}

fn check_group_size(group_size: usize) -> Result<(), ArgumentError> {
    if group_size == 0 {
        return Err(ArgumentError::InvalidGroupSize(group_size));
    }
    Ok(())
}

fn check_specialization(specialization: &Specialization) -> Result<(), ArgumentError> {
    if specialization.max_group_size == Some(0) {
        return Err(ArgumentError::InvalidSpecialization(
            "max_group_size must be at least 1".to_string(),
        ));
    }
    if specialization.min_groups_per_processor == Some(0) {
        return Err(ArgumentError::InvalidSpecialization(
            "min_groups_per_processor must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Loader front-end over one accelerator
///
/// Borrowing and `Copy`; create one wherever a kernel needs loading.
pub struct KernelLoader<'a, A: ?Sized> {
    accelerator: &'a A,
}

impl<A: ?Sized> Clone for KernelLoader<'_, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A: ?Sized> Copy for KernelLoader<'_, A> {}

impl<'a, A: Accelerator + ?Sized> KernelLoader<'a, A> {
    /// Create a loader over `accelerator`
    pub fn new(accelerator: &'a A) -> Self {
        Self { accelerator }
    }

    /// The accelerator this loader targets
    pub fn accelerator(&self) -> &'a A {
        self.accelerator
    }

    // ==== Default tuning ====

    /// Load `routine` with default tuning
    ///
    /// # Errors
    ///
    /// Fails if the routine cannot be resolved statically or the
    /// accelerator rejects the load.
    #[tracing::instrument(skip(self, routine), fields(accelerator = self.accelerator.name()))]
    pub fn load_stream_kernel<I, P, K>(&self, routine: K) -> LoadResult<StreamLauncher<I, P>>
    where
        I: KernelIndex,
        P: KernelParams,
        K: KernelRoutine<I, P>,
    {
        let kernel = resolve(&KernelSource::new(routine))?;
        let handle = self.accelerator.load_kernel(&kernel)?;
        tracing::debug!(kernel = %kernel, "kernel_loaded");
        Ok(StreamLauncher::new(handle))
    }

    /// Load `routine` with default tuning, bound to the default stream
    ///
    /// # Errors
    ///
    /// Fails if the routine cannot be resolved statically or the
    /// accelerator rejects the load.
    #[tracing::instrument(skip(self, routine), fields(accelerator = self.accelerator.name()))]
    pub fn load_kernel<I, P, K>(&self, routine: K) -> LoadResult<Launcher<I, P>>
    where
        I: KernelIndex,
        P: KernelParams,
        K: KernelRoutine<I, P>,
    {
        Ok(self.load_stream_kernel(routine)?.bind(self.accelerator.default_stream()))
    }

    // ==== Specialized ====

    /// Load `routine` with explicit specialization hints
    ///
    /// # Errors
    ///
    /// Fails on degenerate hints before any accelerator interaction, then
    /// as [`Self::load_stream_kernel`].
    #[tracing::instrument(skip(self, routine), fields(accelerator = self.accelerator.name(), %specialization))]
    pub fn load_specialized_stream_kernel<I, P, K>(
        &self,
        routine: K,
        specialization: &Specialization,
    ) -> LoadResult<StreamLauncher<I, P>>
    where
        I: KernelIndex,
        P: KernelParams,
        K: KernelRoutine<I, P>,
    {
        check_specialization(specialization)?;
        let kernel = resolve(&KernelSource::new(routine))?;
        let handle = self.accelerator.load_specialized_kernel(&kernel, specialization)?;
        tracing::debug!(kernel = %kernel, "kernel_loaded");
        Ok(StreamLauncher::new(handle))
    }

    /// Load `routine` with explicit specialization hints, bound to the
    /// default stream
    ///
    /// # Errors
    ///
    /// As [`Self::load_specialized_stream_kernel`].
    #[tracing::instrument(skip(self, routine), fields(accelerator = self.accelerator.name(), %specialization))]
    pub fn load_specialized_kernel<I, P, K>(
        &self,
        routine: K,
        specialization: &Specialization,
    ) -> LoadResult<Launcher<I, P>>
    where
        I: KernelIndex,
        P: KernelParams,
        K: KernelRoutine<I, P>,
    {
        Ok(self
            .load_specialized_stream_kernel(routine, specialization)?
            .bind(self.accelerator.default_stream()))
    }

    // ==== Implicitly grouped ====

    /// Load `routine` with a caller-chosen group size
    ///
    /// # Errors
    ///
    /// Fails with [`ArgumentError::InvalidGroupSize`] for a zero group size
    /// before any accelerator interaction, then as
    /// [`Self::load_stream_kernel`].
    #[tracing::instrument(skip(self, routine), fields(accelerator = self.accelerator.name(), group_size))]
    pub fn load_implicitly_grouped_stream_kernel<I, P, K>(
        &self,
        routine: K,
        group_size: usize,
    ) -> LoadResult<StreamLauncher<I, P>>
    where
        I: KernelIndex,
        P: KernelParams,
        K: KernelRoutine<I, P>,
    {
        check_group_size(group_size)?;
        let kernel = resolve(&KernelSource::new(routine))?;
        let handle = self.accelerator.load_implicitly_grouped_kernel(&kernel, group_size)?;
        tracing::debug!(kernel = %kernel, "kernel_loaded");
        Ok(StreamLauncher::new(handle))
    }

    /// Load `routine` with a caller-chosen group size, bound to the default
    /// stream
    ///
    /// # Errors
    ///
    /// As [`Self::load_implicitly_grouped_stream_kernel`].
    #[tracing::instrument(skip(self, routine), fields(accelerator = self.accelerator.name(), group_size))]
    pub fn load_implicitly_grouped_kernel<I, P, K>(
        &self,
        routine: K,
        group_size: usize,
    ) -> LoadResult<Launcher<I, P>>
    where
        I: KernelIndex,
        P: KernelParams,
        K: KernelRoutine<I, P>,
    {
        Ok(self
            .load_implicitly_grouped_stream_kernel(routine, group_size)?
            .bind(self.accelerator.default_stream()))
    }

    // ==== Auto grouped ====

    /// Load `routine` with occupancy-maximizing grouping
    ///
    /// # Errors
    ///
    /// Fails if the routine cannot be resolved statically or the
    /// accelerator rejects the load.
    #[tracing::instrument(skip(self, routine), fields(accelerator = self.accelerator.name()))]
    pub fn load_auto_grouped_stream_kernel<I, P, K>(&self, routine: K) -> LoadResult<StreamLauncher<I, P>>
    where
        I: KernelIndex,
        P: KernelParams,
        K: KernelRoutine<I, P>,
    {
        Ok(self.load_auto_grouped_stream_kernel_with_occupancy(routine)?.0)
    }

    /// Load `routine` with occupancy-maximizing grouping, bound to the
    /// default stream
    ///
    /// # Errors
    ///
    /// As [`Self::load_auto_grouped_stream_kernel`].
    #[tracing::instrument(skip(self, routine), fields(accelerator = self.accelerator.name()))]
    pub fn load_auto_grouped_kernel<I, P, K>(&self, routine: K) -> LoadResult<Launcher<I, P>>
    where
        I: KernelIndex,
        P: KernelParams,
        K: KernelRoutine<I, P>,
    {
        Ok(self.load_auto_grouped_kernel_with_occupancy(routine)?.0)
    }

    /// Load `routine` with occupancy-maximizing grouping, returning the
    /// occupancy estimate the grouping was derived from
    ///
    /// # Errors
    ///
    /// As [`Self::load_auto_grouped_stream_kernel`].
    #[tracing::instrument(skip(self, routine), fields(accelerator = self.accelerator.name()))]
    pub fn load_auto_grouped_stream_kernel_with_occupancy<I, P, K>(
        &self,
        routine: K,
    ) -> LoadResult<(StreamLauncher<I, P>, Occupancy)>
    where
        I: KernelIndex,
        P: KernelParams,
        K: KernelRoutine<I, P>,
    {
        let kernel = resolve(&KernelSource::new(routine))?;
        let (handle, occupancy) = self.accelerator.load_auto_grouped_kernel(&kernel)?;
        tracing::debug!(kernel = %kernel, %occupancy, "kernel_loaded");
        Ok((StreamLauncher::new(handle), occupancy))
    }

    /// Load `routine` with occupancy-maximizing grouping, bound to the
    /// default stream and returning the occupancy estimate
    ///
    /// # Errors
    ///
    /// As [`Self::load_auto_grouped_stream_kernel`].
    #[tracing::instrument(skip(self, routine), fields(accelerator = self.accelerator.name()))]
    pub fn load_auto_grouped_kernel_with_occupancy<I, P, K>(
        &self,
        routine: K,
    ) -> LoadResult<(Launcher<I, P>, Occupancy)>
    where
        I: KernelIndex,
        P: KernelParams,
        K: KernelRoutine<I, P>,
    {
        let (launcher, occupancy) = self.load_auto_grouped_stream_kernel_with_occupancy(routine)?;
        Ok((launcher.bind(self.accelerator.default_stream()), occupancy))
    }

    // ==== Source-driven loading ====

    /// Load an optional, pre-built source under a runtime-chosen tuning
    ///
    /// The occupancy slot is `Some` exactly when `tuning` is
    /// [`Tuning::AutoGrouped`].
    ///
    /// # Errors
    ///
    /// Fails with [`ArgumentError::MissingKernel`] when no source is given,
    /// with the tuning's argument error when its parameters are degenerate,
    /// both before any accelerator interaction, and otherwise as the
    /// corresponding typed operation.
    #[tracing::instrument(skip(self, source), fields(accelerator = self.accelerator.name(), ?tuning))]
    pub fn load_stream_kernel_from_source<I, P>(
        &self,
        source: Option<&KernelSource<I, P>>,
        tuning: &Tuning,
    ) -> LoadResult<(StreamLauncher<I, P>, Option<Occupancy>)>
    where
        I: KernelIndex,
        P: KernelParams,
    {
        let source = source.ok_or(ArgumentError::MissingKernel)?;
        let (handle, occupancy) = self.load_handle(source, tuning)?;
        Ok((StreamLauncher::new(handle), occupancy))
    }

    /// Load an optional, pre-built source under a runtime-chosen tuning,
    /// bound to the default stream
    ///
    /// # Errors
    ///
    /// As [`Self::load_stream_kernel_from_source`].
    #[tracing::instrument(skip(self, source), fields(accelerator = self.accelerator.name(), ?tuning))]
    pub fn load_kernel_from_source<I, P>(
        &self,
        source: Option<&KernelSource<I, P>>,
        tuning: &Tuning,
    ) -> LoadResult<(Launcher<I, P>, Option<Occupancy>)>
    where
        I: KernelIndex,
        P: KernelParams,
    {
        let (launcher, occupancy) = self.load_stream_kernel_from_source(source, tuning)?;
        Ok((launcher.bind(self.accelerator.default_stream()), occupancy))
    }

    fn load_handle<I, P>(
        &self,
        source: &KernelSource<I, P>,
        tuning: &Tuning,
    ) -> LoadResult<(KernelHandle, Option<Occupancy>)>
    where
        I: KernelIndex,
        P: KernelParams,
    {
        tuning.validate()?;
        let kernel = resolve(source)?;
        let loaded = match *tuning {
            Tuning::Default => (self.accelerator.load_kernel(&kernel)?, None),
            Tuning::Specialized(ref specialization) => {
                (self.accelerator.load_specialized_kernel(&kernel, specialization)?, None)
            }
            Tuning::ImplicitlyGrouped(group_size) => {
                (self.accelerator.load_implicitly_grouped_kernel(&kernel, group_size)?, None)
            }
            Tuning::AutoGrouped => {
                let (handle, occupancy) = self.accelerator.load_auto_grouped_kernel(&kernel)?;
                (handle, Some(occupancy))
            }
        };
        tracing::debug!(kernel = %kernel, "kernel_loaded");
        Ok(loaded)
    }
}

impl<A: Accelerator + ?Sized> std::fmt::Debug for KernelLoader<'_, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KernelLoader")
            .field("accelerator", &self.accelerator.name())
            .finish()
    }
}

// ================================================================================================
// Tests
// ================================================================================================
