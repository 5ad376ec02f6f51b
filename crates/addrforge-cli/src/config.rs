use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "addrforge.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    Missing(PathBuf),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Root holding `common/` and `countries/`.
    pub data_dir: PathBuf,
    pub default_country: String,
    pub default_format: String,
    pub separator: String,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_filter: String,
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            default_country: "United States".to_string(),
            default_format: "json".to_string(),
            separator: ",".to_string(),
            log_filter: "info".to_string(),
            seed: None,
        }
    }
}

/// Loads settings from `explicit`, or from [`DEFAULT_CONFIG_FILE`] when it
/// exists. An explicit path that does not exist is an error.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings, ConfigError> {
    let path = match explicit {
        Some(path) if !path.exists() => return Err(ConfigError::Missing(path.to_path_buf())),
        Some(path) => path.to_path_buf(),
        None => {
            let path = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !path.exists() {
                return Ok(Settings::default());
            }
            path
        }
    };

    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    parse_settings(&content).map_err(|source| ConfigError::Parse { path, source })
}

pub fn parse_settings(content: &str) -> Result<Settings, toml::de::Error> {
    toml::from_str(content)
}
