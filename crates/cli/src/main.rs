//! jobboard - command line client for the job marketplace

mod commands;
mod config;
mod logging;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use commands::Commands;
use config::Overrides;
use tracing::{Level, error, info};

#[derive(Parser, Debug)]
#[command(name = "jobboard")]
#[command(about = "Browse jobs and manage applications on the job marketplace")]
#[command(version)]
struct Cli {
    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "warn")]
    log_level: LogLevel,

    /// Configuration file (defaults to config.toml in the data directory when present)
    #[arg(short = 'c', long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Base URL of the marketplace API
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Directory holding the stored session and logs
    #[arg(short = 'd', long, global = true)]
    data_dir: Option<std::path::PathBuf>,

    /// Request timeout in seconds
    #[arg(short = 't', long, global = true)]
    timeout: Option<u64>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Disable file logging (only log to stderr)
    #[arg(long, global = true)]
    no_file_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = config::load_settings(
        cli.config.as_deref(),
        Overrides {
            base_url: cli.base_url,
            data_dir: cli.data_dir,
            timeout_secs: cli.timeout,
        },
    )?;
    logging::init_logging(
        cli.log_level.into(),
        &settings.resolved_data_dir(),
        cli.no_file_log,
    )?;

    info!(base_url = %settings.base_url, "Starting jobboard");

    match cli.command.execute(&settings, cli.json).await {
        Ok(()) => {
            info!("Command completed successfully");
        }
        Err(e) => {
            error!("Command failed: {e}");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }

    Ok(())
}

#[derive(Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commands::{JobCommands, Role};

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "jobboard",
            "jobs",
            "list",
            "--search",
            "rust",
            "--type",
            "remote",
            "--base-url",
            "https://api.example.com",
            "-l",
            "debug",
        ])
        .unwrap();

        assert_eq!(cli.base_url.as_deref(), Some("https://api.example.com"));
        assert!(matches!(cli.log_level, LogLevel::Debug));
        match cli.command {
            Commands::Jobs {
                command:
                    JobCommands::List {
                        search, job_type, ..
                    },
            } => {
                assert_eq!(search.as_deref(), Some("rust"));
                assert_eq!(job_type.as_deref(), Some("remote"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn register_requires_a_role() {
        let missing = Cli::try_parse_from([
            "jobboard", "register", "--username", "ana", "--password", "pw", "--full-name",
            "Ana", "--email", "ana@example.com", "--phone", "1", "--city", "Nis",
        ]);
        assert!(missing.is_err());

        let cli = Cli::try_parse_from([
            "jobboard", "register", "--username", "ana", "--password", "pw", "--full-name",
            "Ana", "--email", "ana@example.com", "--phone", "1", "--city", "Nis", "--role",
            "employer",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Register {
                role: Role::Employer,
                ..
            }
        ));
    }

    #[test]
    fn apply_takes_job_id_and_optional_message() {
        let cli = Cli::try_parse_from(["jobboard", "apply", "42"]).unwrap();
        match cli.command {
            Commands::Apply { job_id, message } => {
                assert_eq!(job_id, 42);
                assert!(message.is_empty());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn log_level_maps_to_tracing_level() {
        assert_eq!(Level::from(LogLevel::Warn), Level::WARN);
        assert_eq!(Level::from(LogLevel::Trace), Level::TRACE);
    }
}
