//! Process-wide logging setup.

pub mod tracing;

pub use self::tracing::{LogFormat, ParseLogFormatError};

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times; later calls are no-ops.
pub fn init(format: LogFormat) {
    tracing::init(format);
}
