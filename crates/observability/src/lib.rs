//! Process-wide logging setup shared by the server and the CLI.

pub mod tracing;

pub use crate::tracing::{LogFormat, init_with};

/// Initialise JSON logging filtered by `RUST_LOG` (default `info`).
///
/// Safe to call multiple times; later calls are no-ops.
pub fn init() {
    init_with(LogFormat::from_env());
}
