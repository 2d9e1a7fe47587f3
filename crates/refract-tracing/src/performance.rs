//! Performance-focused tracing utilities
//!
//! This module provides utilities for performance instrumentation with
//! automatic timing, bandwidth calculation, and threshold filtering.
//!
//! ## Example
//!
//! ```rust
//! use refract_tracing::performance::{PerformanceSpan, record_transfer};
//!
//! // Create a performance span with threshold filtering
//! let span = PerformanceSpan::new("my_operation", Some(100));
//! // ... do work ...
//! drop(span); // Logs only if duration > 100μs
//!
//! // Record a host-to-accelerator copy
//! record_transfer(4096, "H2D", 250);
//! ```

use std::time::Instant;
use tracing::Level;

/// RAII guard that measures span duration and conditionally logs based on threshold.
///
/// The span is automatically timed when created and logged when dropped, but only
/// if the duration exceeds the optional threshold.
///
/// # Example
///
/// ```rust
/// use refract_tracing::performance::PerformanceSpan;
///
/// {
///     let _span = PerformanceSpan::new("expensive_operation", Some(1000));
///     // ... operation code ...
/// } // Span logged only if duration > 1000μs
/// ```
pub struct PerformanceSpan {
    _span_name: String,
    threshold_us: Option<u64>,
    start_time: Instant,
    span: tracing::Span,
}

impl PerformanceSpan {
    /// Create a new performance span with optional threshold filtering.
    ///
    /// # Arguments
    ///
    /// * `span_name` - Name of the operation being measured
    /// * `threshold_us` - Minimum duration in microseconds to log (None = always log)
    ///
    /// # Example
    ///
    /// ```rust
    /// use refract_tracing::performance::PerformanceSpan;
    ///
    /// // Always log
    /// let span1 = PerformanceSpan::new("always_log", None);
    ///
    /// // Only log if > 100μs
    /// let span2 = PerformanceSpan::new("conditional", Some(100));
    /// ```
    pub fn new(span_name: impl Into<String>, threshold_us: Option<u64>) -> Self {
        let span_name = span_name.into();
        let span = tracing::debug_span!("perf", name = %span_name);
        let start_time = Instant::now();

        Self {
            _span_name: span_name,
            threshold_us,
            start_time,
            span,
        }
    }

    /// Create a new performance span at the specified tracing level.
    ///
    /// # Arguments
    ///
    /// * `level` - Tracing level (Debug, Info, Warn, etc.)
    /// * `span_name` - Name of the operation
    /// * `threshold_us` - Minimum duration in microseconds to log
    ///
    /// # Example
    ///
    /// ```rust
    /// use refract_tracing::performance::PerformanceSpan;
    /// use tracing::Level;
    ///
    /// let span = PerformanceSpan::with_level(
    ///     Level::INFO,
    ///     "important_operation",
    ///     Some(500)
    /// );
    /// ```
    pub fn with_level(level: Level, span_name: impl Into<String>, threshold_us: Option<u64>) -> Self {
        let span_name = span_name.into();
        let span = match level {
            Level::TRACE => tracing::trace_span!("perf", name = %span_name),
            Level::DEBUG => tracing::debug_span!("perf", name = %span_name),
            Level::INFO => tracing::info_span!("perf", name = %span_name),
            Level::WARN => tracing::warn_span!("perf", name = %span_name),
            Level::ERROR => tracing::error_span!("perf", name = %span_name),
        };
        let start_time = Instant::now();

        Self {
            _span_name: span_name,
            threshold_us,
            start_time,
            span,
        }
    }

    /// Get the elapsed time since span creation.
    pub fn elapsed_us(&self) -> u64 {
        self.start_time.elapsed().as_micros() as u64
    }

    /// Enter this span's context.
    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }
}

impl Drop for PerformanceSpan {
    fn drop(&mut self) {
        let elapsed_us = self.elapsed_us();

        // Only log if threshold is None or duration exceeds threshold
        if self.threshold_us.is_none_or(|t| elapsed_us >= t) {
            let _entered = self.span.enter();
            tracing::debug!(
                duration_us = elapsed_us,
                duration_ms = elapsed_us as f64 / 1000.0,
                "performance_span_complete"
            );
        }
    }
}

/// Record a buffer allocation event with standard format.
///
/// Emits a tracing event with allocation details including size, owning
/// accelerator, and duration.
///
/// # Arguments
///
/// * `size_bytes` - Size of allocation in bytes
/// * `accelerator` - Name of the accelerator that owns the buffer
/// * `duration_us` - Time taken for allocation in microseconds
///
/// # Example
///
/// ```rust
/// use refract_tracing::performance::record_allocation;
///
/// record_allocation(1024, "host", 150);
/// ```
pub fn record_allocation(size_bytes: usize, accelerator: &str, duration_us: u64) {
    tracing::debug!(
        event = "allocation",
        size_bytes = size_bytes,
        size_kb = size_bytes as f64 / 1024.0,
        accelerator = accelerator,
        duration_us = duration_us,
        "buffer_allocation"
    );
}

/// Record a kernel launch event with standard format.
///
/// Emits a tracing event with launch details including thread count,
/// duration, and calculated throughput.
///
/// # Arguments
///
/// * `kernel` - Name of the launched kernel
/// * `threads` - Total number of threads in the launch extent
/// * `duration_us` - Launch time in microseconds
///
/// # Example
///
/// ```rust
/// use refract_tracing::performance::record_launch;
///
/// record_launch("saxpy", 1024, 500);
/// ```
pub fn record_launch(kernel: &str, threads: usize, duration_us: u64) {
    let threads_per_sec = if duration_us > 0 {
        (threads as f64 / duration_us as f64) * 1_000_000.0
    } else {
        0.0
    };

    tracing::debug!(
        event = "launch",
        kernel = kernel,
        threads = threads,
        duration_us = duration_us,
        duration_ms = duration_us as f64 / 1000.0,
        threads_per_sec = threads_per_sec,
        "kernel_launch"
    );
}

/// Record a data transfer event with standard format and bandwidth calculation.
///
/// Emits a tracing event with transfer details including size, direction,
/// duration, and calculated bandwidth.
///
/// # Arguments
///
/// * `bytes` - Number of bytes transferred
/// * `direction` - Transfer direction ("H2D" = Host to Device, "D2H" = Device to Host)
/// * `duration_us` - Transfer time in microseconds
///
/// # Example
///
/// ```rust
/// use refract_tracing::performance::record_transfer;
///
/// record_transfer(4096, "H2D", 250);
/// ```
pub fn record_transfer(bytes: usize, direction: &str, duration_us: u64) {
    let bandwidth_mbps = if duration_us > 0 {
        (bytes as f64 / duration_us as f64) * 1_000_000.0 / (1024.0 * 1024.0)
    } else {
        0.0
    };

    tracing::debug!(
        event = "transfer",
        bytes = bytes,
        kb = bytes as f64 / 1024.0,
        direction = direction,
        duration_us = duration_us,
        duration_ms = duration_us as f64 / 1000.0,
        bandwidth_mbps = bandwidth_mbps,
        "data_transfer"
    );
}
