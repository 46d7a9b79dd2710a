//! Logging and tracing setup for rawmodel
//!
//! Structured logging goes through the `tracing` crate; this module only
//! installs the subscriber.

use std::sync::atomic::{AtomicBool, Ordering};

/// Whether tracing has been initialized
static TRACING_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initialize tracing with a custom configuration
///
/// This should be called once at application startup. Later calls are
/// ignored.
pub fn init_with_config(config: TracingConfig) {
    if TRACING_INITIALIZED
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::Relaxed)
        .is_ok()
    {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.default_level));

        let fmt_layer = fmt::layer()
            .with_target(config.show_target)
            .with_thread_ids(config.show_thread_ids)
            .with_file(config.show_file)
            .with_line_number(config.show_line_number);

        // try_init: a host application may already own the global subscriber
        let _ = tracing_subscriber::registry()
            .with(fmt_layer)
            .with(filter)
            .try_init();
    }
}

/// Configuration for tracing initialization
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Default log level filter (e.g., "info", "debug", "warn")
    pub default_level: String,
    /// Show the target (module path) in log output
    pub show_target: bool,
    /// Show thread IDs in log output
    pub show_thread_ids: bool,
    /// Show source file in log output
    pub show_file: bool,
    /// Show line number in log output
    pub show_line_number: bool,
}

impl TracingConfig {
    /// Map a `-v` count to a configuration
    pub fn from_verbosity(verbosity: u8) -> Self {
        let level = match verbosity {
            0 => "warn,rawmodel=info",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };

        Self {
            default_level: level.to_string(),
            show_target: verbosity >= 2,
            show_thread_ids: verbosity >= 3,
            show_file: verbosity >= 3,
            show_line_number: verbosity >= 3,
        }
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            default_level: "warn,rawmodel=info".to_string(),
            show_target: true,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
        }
    }
}

/// Run an operation inside an `info` span and log its duration
pub fn timed<T, F>(name: &str, f: F) -> T
where
    F: FnOnce() -> T,
{
    let span = tracing::info_span!("phase", phase = %name);
    let _guard = span.enter();

    let start = std::time::Instant::now();
    let result = f();
    let duration = start.elapsed();

    tracing::debug!(duration_ms = %duration.as_millis(), "Phase complete");

    result
}
