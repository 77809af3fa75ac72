use anyhow::Result;
use jobboard_frontend_common::logging;
use std::fs::OpenOptions;
use std::path::Path;
use tracing::Level;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn default_filter(level: Level) -> String {
    let level_str = level.as_str().to_lowercase();
    format!("jobboard={level_str},jobboard_http={level_str},jobboard_frontend_common={level_str}")
}

/// Initialize logging for the CLI
///
/// Logs go to stderr, and additionally to `<data_dir>/cli.log` unless file
/// logging is disabled.
pub fn init_logging(log_level: Level, data_dir: &Path, no_file_log: bool) -> Result<()> {
    let filter = default_filter(log_level);

    if no_file_log {
        logging::init_logging(&filter);
        return Ok(());
    }

    std::fs::create_dir_all(data_dir)?;
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join("cli.log"))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(log_file)
                .with_ansi(false),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()?;

    Ok(())
}
