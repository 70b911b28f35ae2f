//! Configuration service.
//!
//! Builds the [`SessionConfig`] from, lowest precedence first: built-in
//! defaults, `~/.config/chemviz/config.toml`, `CHEMVIZ_*` environment
//! variables, and caller-supplied overrides (CLI flags).

use std::path::{Path, PathBuf};

use chemviz_core::config::{ConfigOverrides, SessionConfig};
use chemviz_core::error::{ChemvizError, Result};
use reqwest::Url;

use crate::paths::ChemvizPaths;

pub const ENV_API_URL: &str = "CHEMVIZ_API_URL";
pub const ENV_USERNAME: &str = "CHEMVIZ_USERNAME";
pub const ENV_PASSWORD: &str = "CHEMVIZ_PASSWORD";
pub const ENV_REPORT_DIR: &str = "CHEMVIZ_REPORT_DIR";

/// Loads the session configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    config_file: Option<PathBuf>,
}

impl ConfigService {
    /// Uses the platform config file location.
    ///
    /// If the configuration directory cannot be determined, the file layer
    /// is skipped.
    pub fn new() -> Self {
        Self {
            config_file: ChemvizPaths::config_file().ok(),
        }
    }

    /// Reads the file layer from an explicit path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_file: Some(path.into()),
        }
    }

    /// Loads the configuration using the process environment.
    pub fn load(&self, overrides: &ConfigOverrides) -> Result<SessionConfig> {
        self.load_with_env(|key| std::env::var(key).ok(), overrides)
    }

    /// Loads the configuration with an injectable environment lookup.
    pub fn load_with_env<F>(&self, env: F, overrides: &ConfigOverrides) -> Result<SessionConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = SessionConfig::default();

        if let Some(path) = &self.config_file
            && let Some(file_layer) = read_config_file(path)?
        {
            tracing::debug!("[Config] Loaded {}", path.display());
            file_layer.apply_to(&mut config);
        }

        env_overrides(&env).apply_to(&mut config);
        overrides.apply_to(&mut config);

        validate_api_url(&config.api_url)?;
        Ok(config)
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

fn read_config_file(path: &Path) -> Result<Option<ConfigOverrides>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(None);
    }

    toml::from_str(&content)
        .map(Some)
        .map_err(|e| ChemvizError::config(format!("{}: {}", path.display(), e)))
}

fn env_overrides<F>(env: &F) -> ConfigOverrides
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| env(key).filter(|value| !value.trim().is_empty());
    ConfigOverrides {
        api_url: non_empty(ENV_API_URL),
        username: non_empty(ENV_USERNAME),
        // An empty password is a legitimate value
        password: env(ENV_PASSWORD),
        report_dir: non_empty(ENV_REPORT_DIR).map(PathBuf::from),
        ..Default::default()
    }
}

/// Checks that the API base URL is an absolute http(s) URL.
pub fn validate_api_url(api_url: &str) -> Result<()> {
    let parsed = Url::parse(api_url)
        .map_err(|e| ChemvizError::config(format!("Invalid API URL '{api_url}': {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ChemvizError::config(format!(
            "Unsupported API URL scheme '{scheme}' in '{api_url}'"
        ))),
    }
}
