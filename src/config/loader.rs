use super::{PolarionConfig, DEFAULT_CONFIG_FILE};
use crate::error::{common, ErrorCode, PolarionError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// On-disk layout: settings live under a `[polarion]` table
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    polarion: PolarionConfig,
}

/// Resolves the TOML file and environment layers into a [`PolarionConfig`]
pub struct ConfigLoader {
    base_dir: PathBuf,
    read_env: bool,
}

impl ConfigLoader {
    /// Loader rooted at the current directory that also reads the environment
    pub fn new() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            read_env: true,
        }
    }

    /// Look for the default file in `dir` instead of the current directory
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    /// Skip the `POLARION_*` environment layer
    pub fn without_env(mut self) -> Self {
        self.read_env = false;
        self
    }

    /// Load configuration
    ///
    /// An explicit path must exist. Without one, `polarion.toml` in the base
    /// directory is used when present and defaults otherwise.
    pub async fn load(&self, explicit: Option<&Path>) -> Result<PolarionConfig> {
        let mut config = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(common::config_not_found(path));
                }
                self.load_file(path).await?
            }
            None => {
                let default_path = self.base_dir.join(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    self.load_file(&default_path).await?
                } else {
                    debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    PolarionConfig::default()
                }
            }
        };

        if self.read_env {
            config.merge_env_vars();
        }
        Ok(config)
    }

    async fn load_file(&self, path: &Path) -> Result<PolarionConfig> {
        debug!("Loading configuration from {}", path.display());
        let content = fs::read_to_string(path).await.map_err(|e| {
            PolarionError::config_with_code(
                ErrorCode::CONFIG_NOT_FOUND,
                format!("Failed to read configuration file {}", path.display()),
                None,
            )
            .with_source(e)
        })?;
        Self::load_from_str(&content)
            .map_err(|e| e.with_context(format!("in {}", path.display())))
    }

    /// Parse configuration from TOML text, without any other layer
    pub fn load_from_str(content: &str) -> Result<PolarionConfig> {
        let file: ConfigFile = toml::from_str(content)?;
        Ok(file.polarion)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_from_str() {
        let config = ConfigLoader::load_from_str(
            r#"
[polarion]
server_url = "http://my.polarion.server"
fetch_project_id = "test"
username = "admin"
password = "adminPwd"
timeout_secs = 10
"#,
        )
        .unwrap();

        assert_eq!(config.server_url(), "http://my.polarion.server");
        assert_eq!(config.fetch_project_id(), "test");
        assert_eq!(config.timeout_secs, 10);
        assert!(!config.missing_mandatory_parameters());
    }

    #[test]
    fn test_property_key_aliases() {
        let config = ConfigLoader::load_from_str(
            r#"
[polarion]
"sonar.polarion.url" = "http://alias.server"
"sonar.polarion.fetch.project.id" = "elibrary"
"sonar.polarion.create.project.id" = "bugs"
"sonar.polarion.login.secured" = "admin"
"sonar.polarion.password.secured" = "secret"
"#,
        )
        .unwrap();

        assert_eq!(config.server_url(), "http://alias.server");
        assert_eq!(config.fetch_project_id(), "elibrary");
        assert_eq!(config.create_project_id.as_deref(), Some("bugs"));
        assert_eq!(config.password.as_deref(), Some("secret"));
    }

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = ConfigLoader::load_from_str("").unwrap();
        assert_eq!(config.timeout_secs, 30);
        assert!(config.server_url.is_none());
    }

    #[test]
    fn test_invalid_toml() {
        let err = ConfigLoader::load_from_str("[polarion\nserver_url = 1").unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_INVALID_TOML);
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn test_missing_explicit_file() {
        let dir = TempDir::new().unwrap();
        let loader = ConfigLoader::new().without_env();
        let err = loader
            .load(Some(&dir.path().join("absent.toml")))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_default_file_in_base_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("polarion.toml"),
            "[polarion]\nfetch_project_id = \"drive\"\n",
        )
        .unwrap();

        let config = ConfigLoader::new()
            .with_base_dir(dir.path())
            .without_env()
            .load(None)
            .await
            .unwrap();
        assert_eq!(config.fetch_project_id(), "drive");
    }

    #[tokio::test]
    async fn test_no_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ConfigLoader::new()
            .with_base_dir(dir.path())
            .without_env()
            .load(None)
            .await
            .unwrap();
        assert!(config.missing_mandatory_parameters());
    }
}
