//! Logging setup for frontends

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "jobboard=info,jobboard_http=info,jobboard_frontend_common=info";

/// Install the global subscriber. Safe to call more than once.
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging(default_filter: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Install the global subscriber, writing to the browser console
#[cfg(target_arch = "wasm32")]
pub fn init_logging(default_filter: &str) {
    use tracing_web::MakeWebConsoleWriter;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .without_time()
        .with_writer(MakeWebConsoleWriter::new());

    let _ = tracing_subscriber::registry()
        .with(EnvFilter::new(default_filter))
        .with(fmt_layer)
        .try_init();
}
