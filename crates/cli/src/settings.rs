//! Layered settings: defaults, optional TOML file, then `VETOGEST_*` environment

use config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use vetogest_core::{CoreResult, ValidateConfig, validators};
use vetogest_http::{ApiConfig, StorageError, TokenStore};

/// Variable the web build reads its production API URL from
const LEGACY_API_URL_VAR: &str = "VITE_API_URL";

/// Shell settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    /// Log level used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Where the token pair is persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_token_file")]
    pub token_file: PathBuf,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_token_file() -> PathBuf {
    match ProjectDirs::from("fr", "VetoGest", "vetogest") {
        Some(dirs) => dirs.data_dir().join("tokens.json"),
        None => {
            warn!("Failed to determine platform-specific directories, using current directory");
            PathBuf::from("./tokens.json")
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            token_file: default_token_file(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            storage: StorageConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Load settings, reading `path` if given, else `vetogest.toml` or
    /// `config/vetogest.toml` when present
    pub fn load(path: Option<&Path>) -> CoreResult<Self> {
        Self::load_with_api_url_fallback(path, std::env::var(LEGACY_API_URL_VAR).ok())
    }

    /// Load settings, using `fallback_api_url` when no source sets `api.api_url`
    fn load_with_api_url_fallback(
        path: Option<&Path>,
        fallback_api_url: Option<String>,
    ) -> CoreResult<Self> {
        let mut builder = Config::builder();

        // Start with defaults
        builder = builder.add_source(Config::try_from(&Settings::default())?);

        match path {
            Some(path) => {
                builder = builder.add_source(File::from(path));
            }
            None => {
                for candidate in ["vetogest.toml", "config/vetogest.toml"] {
                    if Path::new(candidate).exists() {
                        debug!(path = candidate, "Using configuration file");
                        builder = builder.add_source(File::with_name(candidate).required(false));
                    }
                }
            }
        }

        // Environment variables with VETOGEST_ prefix override file settings
        builder = builder.add_source(
            Environment::with_prefix("VETOGEST")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let mut settings: Settings = builder.build()?.try_deserialize()?;
        if settings.api.api_url.is_none() {
            settings.api.api_url = fallback_api_url.filter(|url| !url.trim().is_empty());
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Open the configured token file
    pub fn token_store(&self) -> Result<TokenStore, StorageError> {
        TokenStore::file(&self.storage.token_file)
    }
}

impl ValidateConfig for Settings {
    fn validate(&self) -> Result<(), ConfigError> {
        self.api.validate()?;
        validators::validate_not_empty(
            &self.storage.token_file.to_string_lossy(),
            "storage.token_file",
        )?;
        validators::validate_not_empty(&self.log_level, "log_level")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vetogest_core::CoreError;
    use vetogest_http::ApiMode;

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vetogest.toml");
        let token_file = dir.path().join("tokens.json");
        std::fs::write(
            &path,
            format!(
                r#"
log_level = "debug"

[api]
mode = "production"
api_url = "https://api.vetogest.fr"
timeout_secs = 15

[storage]
token_file = "{}"
"#,
                token_file.display().to_string().replace('\\', "\\\\")
            ),
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.api.mode, ApiMode::Production);
        assert_eq!(settings.api.base_url().unwrap(), "https://api.vetogest.fr");
        assert_eq!(settings.api.timeout_secs, Some(15));
        assert_eq!(settings.storage.token_file, token_file);
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn test_file_defaults_fill_missing_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vetogest.toml");
        std::fs::write(&path, "[api]\ndev_origin = \"http://localhost:3000\"\n").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.api.mode, ApiMode::Development);
        assert_eq!(settings.api.base_url().unwrap(), "http://localhost:3000/api");
        assert_eq!(settings.log_level, "warn");
    }

    #[test]
    fn test_legacy_api_url_fills_missing_api_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vetogest.toml");
        std::fs::write(&path, "[api]\nmode = \"production\"\n").unwrap();

        let settings = Settings::load_with_api_url_fallback(
            Some(&path),
            Some("https://api.vetogest.fr/".to_string()),
        )
        .unwrap();
        assert_eq!(settings.api.mode, ApiMode::Production);
        assert_eq!(settings.api.base_url().unwrap(), "https://api.vetogest.fr");
    }

    #[test]
    fn test_configured_api_url_wins_over_legacy_variable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vetogest.toml");
        std::fs::write(
            &path,
            "[api]\nmode = \"production\"\napi_url = \"https://prod.vetogest.fr\"\n",
        )
        .unwrap();

        let settings = Settings::load_with_api_url_fallback(
            Some(&path),
            Some("https://legacy.vetogest.fr".to_string()),
        )
        .unwrap();
        assert_eq!(settings.api.base_url().unwrap(), "https://prod.vetogest.fr");
    }

    #[test]
    fn test_production_file_without_any_url_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vetogest.toml");
        std::fs::write(&path, "[api]\nmode = \"production\"\n").unwrap();

        let result = Settings::load_with_api_url_fallback(Some(&path), Some("  ".to_string()));
        assert!(matches!(result, Err(CoreError::InvalidConfig { .. })));
    }

    #[test]
    fn test_production_without_url_is_rejected() {
        let settings = Settings {
            api: ApiConfig {
                mode: ApiMode::Production,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }
}
