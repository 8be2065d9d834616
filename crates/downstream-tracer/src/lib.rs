//! Downstream Tracer - Command-line host
//!
//! Plays the part of the map application around the tracing library: it reads
//! the line and point layers from GPX files, feeds query points to a
//! [`TraceSession`](downstream_trace_lib::TraceSession) and renders the
//! notifications and selections on the terminal.

pub mod host;
pub mod logging;
pub mod settings;

pub use host::{OutputFormat, TerminalHost};
pub use settings::Settings;

use downstream_trace_lib::DataError;

/// Error types for the command-line host
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Failed to load layers: {0}")]
    Data(#[from] DataError),

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("Failed to encode output: {0}")]
    Json(#[from] serde_json::Error),
}
