use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Backend base URL; endpoints are joined onto it
    pub base_url: Option<String>,
    /// Show the progress line under the message log
    pub show_progress: Option<bool>,
    pub request_timeout_secs: Option<u64>,
}

/// Errors that can occur when loading configuration from disk.
#[derive(Debug)]
pub enum ConfigError {
    /// No platform config directory could be determined.
    NoConfigDir,
    /// Failed to read the configuration file from disk.
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse the configuration file as valid TOML.
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoConfigDir => write!(f, "Failed to determine config directory"),
            ConfigError::Read { path, source } => {
                write!(f, "Failed to read config at {}: {}", path.display(), source)
            }
            ConfigError::Parse { path, source } => {
                write!(f, "Failed to parse config at {}: {}", path.display(), source)
            }
        }
    }
}

impl StdError for ConfigError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ConfigError::NoConfigDir => None,
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
        }
    }
}

/// The settings in effect after layering CLI flags over the config file.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSettings {
    pub base_url: String,
    pub show_progress: bool,
    pub request_timeout: Option<Duration>,
}

impl Config {
    pub fn load() -> Result<Config, Box<dyn StdError>> {
        let config_path = Self::config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn load_from_path(config_path: &Path) -> Result<Config, Box<dyn StdError>> {
        if !config_path.exists() {
            return Ok(Config::default());
        }
        let contents = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
            path: config_path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: config_path.to_path_buf(),
            source,
        })?;
        Ok(config)
    }

    pub fn save(&self) -> Result<(), Box<dyn StdError>> {
        let config_path = Self::config_path()?;
        self.save_to_path(&config_path)
    }

    /// Write through a temp file in the same directory and rename over the target.
    pub fn save_to_path(&self, config_path: &Path) -> Result<(), Box<dyn StdError>> {
        let parent = config_path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty());

        if let Some(dir) = parent {
            fs::create_dir_all(dir)?;
        }

        let contents = toml::to_string_pretty(self)?;
        let mut temp_file = match parent {
            Some(dir) => NamedTempFile::new_in(dir)?,
            None => NamedTempFile::new()?,
        };

        temp_file.write_all(contents.as_bytes())?;
        temp_file.as_file_mut().sync_all()?;
        temp_file
            .persist(config_path)
            .map_err(|err| -> Box<dyn StdError> { Box::new(err) })?;
        Ok(())
    }

    pub fn project_dirs() -> Result<ProjectDirs, ConfigError> {
        ProjectDirs::from("org", "tutorchat", "tutorchat").ok_or(ConfigError::NoConfigDir)
    }

    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Default location of the diagnostics file used by the full-screen client.
    pub fn default_diagnostics_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::project_dirs()?.data_local_dir().join("tutorchat.log"))
    }

    pub fn resolve(&self, base_url: Option<&str>, no_progress: bool) -> ResolvedSettings {
        let base_url = base_url
            .map(str::to_string)
            .or_else(|| self.base_url.clone())
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        ResolvedSettings {
            base_url,
            show_progress: !no_progress && self.show_progress.unwrap_or(true),
            // A zero timeout would fail every request before it is sent
            request_timeout: self
                .request_timeout_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        }
    }

    pub fn print_all(&self) {
        println!("Current configuration:");
        match &self.base_url {
            Some(url) => println!("  base-url: {url}"),
            None => println!("  base-url: (unset, using {DEFAULT_BASE_URL})"),
        }
        match self.show_progress.unwrap_or(true) {
            true => println!("  progress: on"),
            false => println!("  progress: off"),
        }
        match self.request_timeout_secs {
            Some(secs) => println!("  timeout: {secs}s"),
            None => println!("  timeout: (none)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from_path(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config {
            base_url: Some("http://tutor.test".to_string()),
            show_progress: Some(false),
            request_timeout_secs: Some(30),
        };

        config.save_to_path(&path).unwrap();
        assert_eq!(Config::load_from_path(&path).unwrap(), config);
    }

    #[test]
    fn invalid_toml_reports_parse_error_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "base_url = [").unwrap();

        let err = Config::load_from_path(&path).unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Failed to parse config at"));
        assert!(message.contains("config.toml"));
    }

    #[test]
    fn cli_flags_override_config_values() {
        let config = Config {
            base_url: Some("http://from-config".to_string()),
            show_progress: Some(true),
            request_timeout_secs: Some(5),
        };

        let resolved = config.resolve(Some("http://from-flag"), true);
        assert_eq!(resolved.base_url, "http://from-flag");
        assert!(!resolved.show_progress);
        assert_eq!(resolved.request_timeout, Some(Duration::from_secs(5)));

        let from_config = config.resolve(None, false);
        assert_eq!(from_config.base_url, "http://from-config");
        assert!(from_config.show_progress);
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let resolved = Config::default().resolve(None, false);
        assert_eq!(resolved.base_url, DEFAULT_BASE_URL);
        assert!(resolved.show_progress);
        assert_eq!(resolved.request_timeout, None);

        let blank = Config {
            base_url: Some("  ".to_string()),
            ..Config::default()
        };
        assert_eq!(blank.resolve(None, false).base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn zero_timeout_in_file_means_no_timeout() {
        let config: Config = toml::from_str("request_timeout_secs = 0").unwrap();
        assert_eq!(config.request_timeout_secs, Some(0));
        assert_eq!(config.resolve(None, false).request_timeout, None);
    }
}
