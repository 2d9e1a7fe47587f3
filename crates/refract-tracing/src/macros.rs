//! Convenience macros for performance tracing
//!
//! These macros wrap the common instrumentation patterns used on the kernel
//! launch and memory transfer paths so call sites stay to a single line.

/// Create a performance span with automatic field capture.
///
/// Returns a [`crate::performance::PerformanceSpan`] guard that logs its own
/// duration when dropped. Extra fields are attached to an entered debug span
/// so they show up alongside the timing event.
///
/// # Syntax
///
/// ```text
/// perf_span!("name")
/// perf_span!("name", field1 = value1)
/// perf_span!("name", field1 = value1, field2 = value2, ...)
/// ```
///
/// # Example
///
/// ```rust
/// use refract_tracing::perf_span;
///
/// {
///     let _span = perf_span!("kernel_invoke", kernel = "saxpy", threads = 1024);
///     // ... launch code ...
/// } // Automatically logs duration with fields
/// ```
#[macro_export]
macro_rules! perf_span {
    ($name:expr) => {{
        $crate::performance::PerformanceSpan::new($name, None)
    }};
    ($name:expr, $($field:tt = $value:expr),+ $(,)?) => {{
        let _span = tracing::debug_span!(
            "perf",
            name = $name,
            $($field = $value),+
        ).entered();
        $crate::performance::PerformanceSpan::new($name, None)
    }};
}

/// Emit a standardized performance event at debug level.
///
/// # Syntax
///
/// ```text
/// perf_event!("name", metric1 = value1, metric2 = value2, ...)
/// ```
///
/// # Example
///
/// ```rust
/// use refract_tracing::perf_event;
///
/// perf_event!("buffer_allocated",
///     size_bytes = 4096,
///     duration_us = 12,
///     accelerator = "host"
/// );
/// ```
#[macro_export]
macro_rules! perf_event {
    ($name:expr, $($field:tt = $value:expr),+ $(,)?) => {
        tracing::debug!(
            event = $name,
            $($field = $value),+
        );
    };
}

/// Execute a block of code with automatic timing.
///
/// Returns a tuple of (result, duration_in_microseconds). Useful for timing
/// a section without introducing a guard variable.
///
/// # Syntax
///
/// ```text
/// let (result, duration_us) = timed_block!("operation_name", {
///     // code to time
/// });
/// ```
///
/// # Example
///
/// ```rust
/// use refract_tracing::timed_block;
///
/// let (sum, duration_us) = timed_block!("reduction", {
///     (1..=100).sum::<i32>()
/// });
///
/// println!("Sum: {}, took {}μs", sum, duration_us);
/// ```
#[macro_export]
macro_rules! timed_block {
    ($name:expr, $block:block) => {{
        let start = std::time::Instant::now();
        let result = $block;
        let duration_us = start.elapsed().as_micros() as u64;
        tracing::debug!(
            operation = $name,
            duration_us = duration_us,
            duration_ms = duration_us as f64 / 1000.0,
            "timed_block_complete"
        );
        (result, duration_us)
    }};
}

/// Create a performance span with threshold filtering.
///
/// Only logs if the duration exceeds the specified threshold in microseconds.
/// Keeps per-launch spans quiet on fast paths while still catching stalls.
///
/// # Syntax
///
/// ```text
/// perf_span_threshold!("name", threshold_us)
/// perf_span_threshold!("name", threshold_us, field1 = value1, ...)
/// ```
///
/// # Example
///
/// ```rust
/// use refract_tracing::perf_span_threshold;
///
/// {
///     // Only logs if duration > 1000μs (1ms)
///     let _span = perf_span_threshold!("stream_synchronize", 1000, stream = 0);
///     // ... wait code ...
/// }
/// ```
#[macro_export]
macro_rules! perf_span_threshold {
    ($name:expr, $threshold_us:expr) => {{
        $crate::performance::PerformanceSpan::new($name, Some($threshold_us))
    }};
    ($name:expr, $threshold_us:expr, $($field:tt = $value:expr),+ $(,)?) => {{
        let _span = tracing::debug_span!(
            "perf",
            name = $name,
            $($field = $value),+
        ).entered();
        $crate::performance::PerformanceSpan::new($name, Some($threshold_us))
    }};
}
