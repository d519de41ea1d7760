//! API endpoint configuration

use super::error::ClientError;
use config::ConfigError;
use serde::{Deserialize, Serialize};
use vetogest_core::{ValidateConfig, validators};

/// How the base URL is selected
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiMode {
    /// Requests go through the dev server's reverse proxy path
    #[default]
    Development,
    /// Requests go to the externally configured absolute URL
    Production,
}

/// API configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub mode: ApiMode,
    /// Origin of the development server hosting the proxy
    #[serde(default = "default_dev_origin")]
    pub dev_origin: String,
    /// Proxy path under the development origin
    #[serde(default = "default_proxy_path")]
    pub proxy_path: String,
    /// Absolute API URL, required in production
    #[serde(default)]
    pub api_url: Option<String>,
    /// Request timeout; the transport default applies when unset
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_dev_origin() -> String {
    "http://127.0.0.1:5173".to_string()
}

fn default_proxy_path() -> String {
    "/api".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            mode: ApiMode::default(),
            dev_origin: default_dev_origin(),
            proxy_path: default_proxy_path(),
            api_url: None,
            timeout_secs: None,
        }
    }
}

impl ApiConfig {
    /// Resolve the base URL for the configured mode
    pub fn base_url(&self) -> Result<String, ClientError> {
        match self.mode {
            ApiMode::Development => Ok(format!(
                "{}{}",
                self.dev_origin.trim_end_matches('/'),
                self.proxy_path
            )),
            ApiMode::Production => self
                .api_url
                .as_ref()
                .filter(|url| !url.trim().is_empty())
                .map(|url| url.trim_end_matches('/').to_string())
                .ok_or_else(|| {
                    ClientError::Configuration(
                        "api.api_url is required in production mode".into(),
                    )
                }),
        }
    }
}

impl ValidateConfig for ApiConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        match self.mode {
            ApiMode::Development => {
                validators::validate_url(&self.dev_origin, "api.dev_origin")?;
                validators::validate_path(&self.proxy_path, "api.proxy_path")?;
            }
            ApiMode::Production => {
                let url = self.api_url.as_deref().unwrap_or_default();
                validators::validate_not_empty(url, "api.api_url")?;
                validators::validate_url(url, "api.api_url")?;
            }
        }

        if let Some(secs) = self.timeout_secs {
            validators::validate_range(secs, 1, 300, "api.timeout_secs")?;
        }
        Ok(())
    }
}
