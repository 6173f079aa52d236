//! Log output for the command runner.
//!
//! stdout carries only JSON result lines, so logs always go to stderr.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Installs the global subscriber.
///
/// Filtering follows `RUST_LOG` and defaults to INFO. With `json_only` no
/// subscriber is installed at all. Keep the returned guard alive until exit
/// so buffered lines are flushed.
pub fn setup_logging(json_only: bool) -> Option<WorkerGuard> {
    if json_only {
        return None;
    }

    let (non_blocking_stderr, guard) = tracing_appender::non_blocking(std::io::stderr());

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .init();

    Some(guard)
}
