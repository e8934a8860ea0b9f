//! Logging utilities for hadley.
//!
//! Library code only emits `tracing` events; installing a subscriber is left
//! to the caller, with [`init_tracing`] as the conventional setup.

use std::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::{HadleyError, Result};

/// Initialize the tracing subscriber with the given log level
pub fn init_tracing(log_level: &str) {
    let filter = match std::env::var("RUST_LOG") {
        Ok(val) => val,
        Err(_) => log_level.to_string(),
    };

    // A subscriber may already be installed by the host application
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .try_init();
}

/// Log the start of a top-level step such as loading configuration
pub fn log_operation_start(operation: &str, details: Option<&str>) {
    match details {
        Some(details) => info!(operation, details, "Starting operation"),
        None => info!(operation, "Starting operation"),
    }
}

/// Log the end of a step started with [`log_operation_start`]
pub fn log_operation_end(operation: &str, start_time: Instant, success: bool) {
    let duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;

    if success {
        info!(operation, duration_ms, "Operation completed successfully");
    } else {
        warn!(operation, duration_ms, "Operation failed");
    }
}

/// Run a fallible computation, logging its duration and any error
///
/// Failures are reported through [`log_error`] with the operation name as
/// context before being returned unchanged.
pub fn log_timed_operation<T, F>(operation: &str, f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let start = Instant::now();
    let operation_id = generate_operation_id();

    debug!(operation, operation_id = %operation_id, "Starting operation");

    let result = f();
    let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

    match &result {
        Ok(_) => debug!(
            operation,
            operation_id = %operation_id,
            duration_ms,
            "Operation completed"
        ),
        Err(err) => log_error(err, operation),
    }

    result
}

/// Log the size of a grouped reduction
pub fn log_reduction_stats(operation: &str, observations: usize, groups: usize, shape: &[usize]) {
    debug!(
        operation = operation,
        observations = observations,
        groups = groups,
        shape = ?shape,
        "Reduction finished"
    );
}

/// Log an error with context
pub fn log_error(error: &HadleyError, context: &str) {
    error!(
        error = %error,
        context = context,
        error_type = std::any::type_name_of_val(error),
        "Error occurred"
    );
}

/// Generate a unique operation ID
pub fn generate_operation_id() -> String {
    Uuid::new_v4().to_string()
}
