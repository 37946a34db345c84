//! Tracing/logging setup shared by every process that embeds the dispatcher.

/// Initialize process-wide logging.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(tracing::LogFormat::from_env());
}

/// Subscriber configuration (filters, output format).
pub mod tracing;

pub use self::tracing::LogFormat;
