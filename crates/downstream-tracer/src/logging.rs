//! Logging and profiling setup for the command-line host
//!
//! Log lines go to stderr so that stdout only carries the click reports. With
//! the `profiling` feature, setting `ENABLE_PROFILING` additionally records a
//! Chrome trace (open it with Perfetto) that is flushed when the returned guard
//! is dropped.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Default filter used when `RUST_LOG` is unset
pub fn default_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "info,downstream_trace_lib=debug,downstream_tracer=debug"
    } else {
        "info"
    }
}

/// Keeps the profiling output alive until dropped
#[must_use = "dropping the guard stops profiling output"]
pub struct LoggingGuard {
    #[cfg(feature = "profiling")]
    _chrome: Option<tracing_chrome::FlushGuard>,
}

/// Initialize the global tracing subscriber
///
/// Must be called once, at startup, before any other thread is spawned.
pub fn setup_logging() -> LoggingGuard {
    let defaulted = std::env::var("RUST_LOG").is_err();
    if defaulted {
        // Safety: single-threaded at startup
        unsafe {
            std::env::set_var("RUST_LOG", default_filter());
        }
    }

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_default_env());

    #[cfg(feature = "profiling")]
    let guard = {
        let (chrome_layer, flush_guard) = if std::env::var("ENABLE_PROFILING").is_ok() {
            let path = std::env::temp_dir().join(format!(
                "downstream-tracer-{}.json",
                std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .map(|d| d.as_secs())
                    .unwrap_or_default()
            ));
            let (layer, guard) = tracing_chrome::ChromeLayerBuilder::new()
                .file(&path)
                .include_args(true)
                .build();
            eprintln!("Profiling to {}", path.display());
            (Some(layer), Some(guard))
        } else {
            (None, None)
        };

        tracing_subscriber::registry()
            .with(chrome_layer)
            .with(fmt_layer)
            .init();

        LoggingGuard {
            _chrome: flush_guard,
        }
    };

    #[cfg(not(feature = "profiling"))]
    let guard = {
        tracing_subscriber::registry().with(fmt_layer).init();
        LoggingGuard {}
    };

    if defaulted {
        tracing::debug!("RUST_LOG set to default: {}", default_filter());
    }

    guard
}
