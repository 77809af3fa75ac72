//! CLI configuration utilities

use anyhow::{Context, Result};
use jobboard_frontend_common::ClientSettings;
use std::path::{Path, PathBuf};

/// Command line overrides applied on top of the loaded settings
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
}

/// Name of the configuration file looked up in the data directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// `config.toml` inside the data directory the command line points at, or the platform default
pub fn default_config_path(data_dir: Option<&Path>) -> PathBuf {
    let settings = ClientSettings {
        data_dir: data_dir.map(Path::to_path_buf),
        ..ClientSettings::default()
    };
    settings.resolved_data_dir().join(CONFIG_FILE_NAME)
}

/// Load settings from `config_file` (or the data directory's `config.toml` when
/// present), the environment, and finally the command line
pub fn load_settings(config_file: Option<&Path>, overrides: Overrides) -> Result<ClientSettings> {
    let file = match config_file {
        Some(path) => Some(path.to_path_buf()),
        None => Some(default_config_path(overrides.data_dir.as_deref())).filter(|p| p.exists()),
    };

    let mut settings = ClientSettings::load(file.as_deref()).with_context(|| match &file {
        Some(path) => format!("Failed to load configuration from {}", path.display()),
        None => "Failed to load configuration".to_string(),
    })?;

    if let Some(base_url) = overrides.base_url {
        settings.base_url = base_url;
    }
    if let Some(data_dir) = overrides.data_dir {
        settings.data_dir = Some(data_dir);
    }
    if let Some(timeout_secs) = overrides.timeout_secs {
        settings.timeout_secs = timeout_secs;
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_wins_over_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            "base_url = \"https://file.example.com/api\"\ntimeout_secs = 9\n",
        )
        .unwrap();

        let settings = load_settings(
            None,
            Overrides {
                base_url: Some("https://flag.example.com/api".into()),
                data_dir: Some(dir.path().to_path_buf()),
                timeout_secs: None,
            },
        )
        .unwrap();

        assert_eq!(settings.base_url, "https://flag.example.com/api");
        assert_eq!(settings.timeout_secs, 9);
        assert_eq!(settings.data_dir.as_deref(), Some(dir.path()));
    }

    #[test]
    fn default_config_lives_in_the_data_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            default_config_path(Some(dir.path())),
            dir.path().join(CONFIG_FILE_NAME)
        );

        let platform_default = ClientSettings::default().resolved_data_dir();
        assert_eq!(
            default_config_path(None),
            platform_default.join(CONFIG_FILE_NAME)
        );
    }
}
