//! Tracing and logging setup shared by every binary.

/// Tracing configuration (filters, layers).
pub mod tracing;

pub use tracing::{LogFormat, LogFormatError};

/// Initialize process-wide observability with the given output format.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init(format: LogFormat) {
    tracing::init(format);
}
