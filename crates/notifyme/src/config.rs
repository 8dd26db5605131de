use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use notification_server::SignalQueueConfig;
use serde::Deserialize;

/// Stores references to all the paths relevant to notifyme, and abstracts access to these files and directories
#[derive(Debug, Clone)]
pub struct NotifymePaths {
    pub config_dir: PathBuf,
    pub log_dir: PathBuf,
    pub log_file: PathBuf,
}

impl NotifymePaths {
    pub fn from_config_dir<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref();
        if config_dir.is_file() {
            bail!("Please provide the path to the config directory, not a file within it")
        }

        let log_dir = std::env::var("XDG_CACHE_HOME")
            .map(PathBuf::from)
            .or_else(|_| std::env::var("HOME").map(|home| PathBuf::from(home).join(".cache")))
            .context("Neither XDG_CACHE_HOME nor HOME is set")?
            .join("notifyme");

        Ok(NotifymePaths { config_dir: config_dir.to_path_buf(), log_file: log_dir.join("notifyme.log"), log_dir })
    }

    pub fn default() -> Result<Self> {
        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|_| std::env::var("HOME").map(|home| PathBuf::from(home).join(".config")))
            .context("Neither XDG_CONFIG_HOME nor HOME is set")?
            .join("notifyme");

        Self::from_config_dir(config_dir)
    }

    pub fn get_config_file(&self) -> PathBuf {
        self.config_dir.join("notifyme.toml")
    }

    pub fn get_css_file(&self) -> PathBuf {
        self.config_dir.join("notifyme.css")
    }

    pub fn get_log_file(&self) -> &Path {
        self.log_file.as_path()
    }

    /// Create the log directory if it doesn't exist yet.
    pub fn ensure_log_dir(&self) -> Result<()> {
        if !self.log_dir.exists() {
            log::info!("Creating log dir");
            std::fs::create_dir_all(&self.log_dir)
                .with_context(|| format!("Failed to create log directory {}", self.log_dir.display()))?;
        }
        Ok(())
    }
}

impl std::fmt::Display for NotifymePaths {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "config-dir: {}, log-file: {}", self.config_dir.display(), self.log_file.display())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PopupConfig {
    pub width: i32,
    pub offset_x: i32,
    pub offset_y: i32,
    pub spacing: i32,
    pub icon_size: i32,
    pub max_width_chars: i32,
}

impl Default for PopupConfig {
    fn default() -> Self {
        PopupConfig { width: 360, offset_x: 10, offset_y: 10, spacing: 10, icon_size: 64, max_width_chars: 45 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Used when a caller asks for the server's default expiration.
    pub default_timeout_ms: i32,
    pub signal_queue: SignalQueueConfig,
    pub popup: PopupConfig,
    /// Command run with the application name appended, to focus the application of an opened notification.
    pub open_command: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            default_timeout_ms: 10_000,
            signal_queue: SignalQueueConfig::default(),
            popup: PopupConfig::default(),
            open_command: vec!["wmctrl".to_string(), "-xa".to_string()],
        }
    }
}

impl Config {
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        if config.default_timeout_ms < 0 {
            bail!("default_timeout_ms must not be negative, but got {}", config.default_timeout_ms);
        }
        Ok(config)
    }

    /// Read the configuration file, falling back to the defaults if there is none.
    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No configuration file at {}, using defaults", path.display());
            return Ok(Config::default());
        }
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read configuration file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid configuration file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notification_server::OverflowPolicy;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_config() {
        let config = Config::parse(
            r#"
default_timeout_ms = 5000
open_command = []

[signal_queue]
overflow = "drop-newest"

[popup]
spacing = 4
"#,
        )
        .unwrap();
        assert_eq!(config.default_timeout_ms, 5000);
        assert!(config.open_command.is_empty());
        assert_eq!(config.signal_queue, SignalQueueConfig { capacity: 64, overflow: OverflowPolicy::DropNewest });
        assert_eq!(config.popup, PopupConfig { spacing: 4, ..PopupConfig::default() });
    }

    #[test]
    fn test_negative_default_timeout_is_rejected() {
        assert!(Config::parse("default_timeout_ms = -1").is_err());
    }

    #[test]
    fn test_unknown_overflow_policy_is_rejected() {
        assert!(Config::parse("[signal_queue]\noverflow = \"drop-everything\"").is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::read_from_file("/nonexistent/notifyme/notifyme.toml").unwrap();
        assert_eq!(config, Config::default());
    }
}
