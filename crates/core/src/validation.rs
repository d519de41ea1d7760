//! Configuration validation support

use config::ConfigError;
use serde::{Deserialize, Serialize};

/// Trait for validating configuration values
pub trait ValidateConfig: Serialize + for<'de> Deserialize<'de> {
    /// Validate the configuration
    ///
    /// Returns Ok(()) if valid, or an error describing what's wrong
    fn validate(&self) -> Result<(), ConfigError>;
}

/// Common validation helpers
pub mod validators {
    use config::ConfigError;

    /// Validate that a string is not empty
    pub fn validate_not_empty(value: &str, field: &str) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::Message(format!("{field}: cannot be empty")));
        }
        Ok(())
    }

    /// Validate URL format
    pub fn validate_url(url: &str, field: &str) -> Result<(), ConfigError> {
        let parsed = url::Url::parse(url)
            .map_err(|e| ConfigError::Message(format!("{field}: invalid URL - {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::Message(format!(
                "{field}: unsupported scheme '{}'",
                parsed.scheme()
            )));
        }
        Ok(())
    }

    /// Validate that an API path starts with a slash
    pub fn validate_path(path: &str, field: &str) -> Result<(), ConfigError> {
        if !path.starts_with('/') {
            return Err(ConfigError::Message(format!(
                "{field}: must start with '/'"
            )));
        }
        Ok(())
    }

    /// Validate that a value is within range
    pub fn validate_range<T: PartialOrd + std::fmt::Display>(
        value: T,
        min: T,
        max: T,
        field: &str,
    ) -> Result<(), ConfigError> {
        if value < min || value > max {
            return Err(ConfigError::Message(format!(
                "{field}: must be between {min} and {max}"
            )));
        }
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_validate_url() {
            assert!(validate_url("https://api.vetogest.fr", "api.api_url").is_ok());
            assert!(validate_url("/api", "api.api_url").is_err());
            assert!(validate_url("ftp://files.example.com", "api.api_url").is_err());
        }

        #[test]
        fn test_validate_path_and_range() {
            assert!(validate_path("/api", "api.proxy_path").is_ok());
            assert!(validate_path("api", "api.proxy_path").is_err());
            assert!(validate_range(30, 1, 300, "api.timeout_secs").is_ok());
            assert!(validate_range(0, 1, 300, "api.timeout_secs").is_err());
        }

        #[test]
        fn test_validate_not_empty() {
            assert!(validate_not_empty("  ", "storage.token_file").is_err());
            assert!(validate_not_empty("tokens.json", "storage.token_file").is_ok());
        }
    }
}
