use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::auth::Credentials;

/// Base URL used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api";
pub const DEFAULT_USERNAME: &str = "admin";
pub const DEFAULT_PASSWORD: &str = "admin123";

/// Per-request timeouts for the backend API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTimeouts {
    /// History, latest dataset and dataset detail requests.
    pub read: Duration,
    pub upload: Duration,
    pub report: Duration,
}

impl Default for RequestTimeouts {
    fn default() -> Self {
        Self {
            read: Duration::from_secs(10),
            upload: Duration::from_secs(30),
            report: Duration::from_secs(20),
        }
    }
}

/// Explicit session configuration, built once at startup and threaded
/// through the controller and the API client.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub api_url: String,
    /// Seed credentials for the session.
    pub credentials: Credentials,
    pub timeouts: RequestTimeouts,
    /// Directory reports are saved into.
    pub report_dir: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            credentials: Credentials::new(DEFAULT_USERNAME, DEFAULT_PASSWORD),
            timeouts: RequestTimeouts::default(),
            report_dir: PathBuf::from("."),
        }
    }
}

/// Partial configuration as written in `config.toml`.
///
/// Every field is optional; unset fields keep the value from the layer
/// below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigOverrides {
    pub api_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub report_dir: Option<PathBuf>,
    pub read_timeout_secs: Option<u64>,
    pub upload_timeout_secs: Option<u64>,
    pub report_timeout_secs: Option<u64>,
}

impl ConfigOverrides {
    /// Applies the set fields on top of `config`.
    pub fn apply_to(&self, config: &mut SessionConfig) {
        if let Some(api_url) = &self.api_url {
            config.api_url = api_url.clone();
        }
        if let Some(username) = &self.username {
            config.credentials.username = username.clone();
        }
        if let Some(password) = &self.password {
            config.credentials.password = password.clone();
        }
        if let Some(report_dir) = &self.report_dir {
            config.report_dir = report_dir.clone();
        }
        if let Some(secs) = self.read_timeout_secs {
            config.timeouts.read = Duration::from_secs(secs);
        }
        if let Some(secs) = self.upload_timeout_secs {
            config.timeouts.upload = Duration::from_secs(secs);
        }
        if let Some(secs) = self.report_timeout_secs {
            config.timeouts.report = Duration::from_secs(secs);
        }
    }
}
