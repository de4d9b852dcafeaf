use crate::abstractions::Credentials;
use crate::error::{common, Result};
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub mod loader;

pub use loader::ConfigLoader;

/// Valid log levels for configuration validation.
pub const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MEASURES_PATH: &str = ".polarion/measures.json";
pub const DEFAULT_CONFIG_FILE: &str = "polarion.toml";

/// Connection and reporting settings for the Polarion sensor
///
/// Loaded in layers: defaults, TOML file, `POLARION_*` environment
/// variables, then command line overrides. The `sonar.polarion.*` property
/// keys are accepted as aliases in the file.
#[derive(Clone, Deserialize)]
pub struct PolarionConfig {
    #[serde(default, alias = "sonar.polarion.url")]
    pub server_url: Option<String>,

    /// Project whose defects are counted
    #[serde(default, alias = "sonar.polarion.fetch.project.id")]
    pub fetch_project_id: Option<String>,

    /// Project new defects would be created in; not needed for metrics
    #[serde(default, alias = "sonar.polarion.create.project.id")]
    pub create_project_id: Option<String>,

    #[serde(default, alias = "sonar.polarion.login.secured")]
    pub username: Option<String>,

    #[serde(default, alias = "sonar.polarion.password.secured")]
    pub password: Option<String>,

    /// Upper bound for every remote call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_measures_path")]
    pub measures_path: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_measures_path() -> PathBuf {
    PathBuf::from(DEFAULT_MEASURES_PATH)
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for PolarionConfig {
    fn default() -> Self {
        Self {
            server_url: None,
            fetch_project_id: None,
            create_project_id: None,
            username: None,
            password: None,
            timeout_secs: default_timeout_secs(),
            measures_path: default_measures_path(),
            log_level: default_log_level(),
        }
    }
}

impl fmt::Debug for PolarionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolarionConfig")
            .field("server_url", &self.server_url)
            .field("fetch_project_id", &self.fetch_project_id)
            .field("create_project_id", &self.create_project_id)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .field("measures_path", &self.measures_path)
            .field("log_level", &self.log_level)
            .finish()
    }
}

/// Values given on the command line, highest precedence
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub server_url: Option<String>,
    pub fetch_project_id: Option<String>,
    pub username: Option<String>,
    pub timeout_secs: Option<u64>,
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

impl PolarionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge_env_vars(&mut self) {
        self.merge_env_with(|key| std::env::var(key).ok());
    }

    /// Merge `POLARION_*` variables from an arbitrary lookup
    pub fn merge_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("POLARION_URL") {
            self.server_url = Some(url);
        }
        if let Some(project) = lookup("POLARION_FETCH_PROJECT_ID") {
            self.fetch_project_id = Some(project);
        }
        if let Some(project) = lookup("POLARION_CREATE_PROJECT_ID") {
            self.create_project_id = Some(project);
        }
        if let Some(username) = lookup("POLARION_USERNAME") {
            self.username = Some(username);
        }
        if let Some(password) = lookup("POLARION_PASSWORD") {
            self.password = Some(password);
        }
        if let Some(timeout) = lookup("POLARION_TIMEOUT_SECS") {
            match timeout.parse::<u64>() {
                Ok(value) => self.timeout_secs = value,
                Err(_) => tracing::warn!("Ignoring invalid POLARION_TIMEOUT_SECS: {}", timeout),
            }
        }
        if let Some(path) = lookup("POLARION_MEASURES_PATH") {
            self.measures_path = PathBuf::from(path);
        }
        if let Some(level) = lookup("POLARION_LOG_LEVEL") {
            self.log_level = level;
        }
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(url) = &overrides.server_url {
            self.server_url = Some(url.clone());
        }
        if let Some(project) = &overrides.fetch_project_id {
            self.fetch_project_id = Some(project.clone());
        }
        if let Some(username) = &overrides.username {
            self.username = Some(username.clone());
        }
        if let Some(timeout) = overrides.timeout_secs {
            self.timeout_secs = timeout;
        }
    }

    /// Names of mandatory parameters that are absent or empty
    pub fn missing_parameters(&self) -> Vec<&'static str> {
        tracing::debug!("server URL: {:?}", self.server_url);
        tracing::debug!("projectId: {:?}", self.fetch_project_id);
        tracing::debug!("username: {:?}", self.username);

        let mut missing = Vec::new();
        if is_blank(&self.server_url) {
            missing.push("server_url");
        }
        if is_blank(&self.fetch_project_id) {
            missing.push("fetch_project_id");
        }
        if is_blank(&self.username) {
            missing.push("username");
        }
        if is_blank(&self.password) {
            missing.push("password");
        }
        missing
    }

    pub fn missing_mandatory_parameters(&self) -> bool {
        !self.missing_parameters().is_empty()
    }

    /// Reject values that are present but unusable
    pub fn validate_values(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(common::zero_timeout());
        }
        Ok(())
    }

    /// Fail with the list of missing parameters, if any, then validate values
    pub fn ensure_complete(&self) -> Result<()> {
        let missing = self.missing_parameters();
        if !missing.is_empty() {
            return Err(common::missing_mandatory_parameters(&missing));
        }
        self.validate_values()
    }

    pub fn server_url(&self) -> &str {
        self.server_url.as_deref().unwrap_or_default()
    }

    pub fn fetch_project_id(&self) -> &str {
        self.fetch_project_id.as_deref().unwrap_or_default()
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(
            self.username.clone().unwrap_or_default(),
            self.password.clone().unwrap_or_default(),
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Level for the log filter, falling back to `info` for unknown values
    pub fn effective_log_level(&self) -> &str {
        let level = self.log_level.as_str();
        if VALID_LOG_LEVELS.contains(&level) {
            level
        } else {
            "info"
        }
    }
}
