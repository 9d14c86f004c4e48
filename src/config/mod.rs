//! Configuration module for the foodshare client.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::time::Duration;

/// Credentials and identifiers for the image host.
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub upload_preset: String,
    /// Required only for the signed delete used as upload compensation
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
}

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the REST backend, without a trailing slash
    pub backend_url: String,
    /// Image host account identifier
    pub cloudinary_cloud_name: Option<String>,
    /// Unsigned upload preset identifier
    pub cloudinary_upload_preset: Option<String>,
    pub cloudinary_api_key: Option<String>,
    pub cloudinary_api_secret: Option<String>,
    /// Bearer ID token used by the command-line front end
    pub id_token: Option<String>,
    /// Per-request timeout for backend and image host calls
    pub request_timeout: Duration,
    /// Public base URL of the web app, used to build share links
    pub share_base_url: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let backend_url = env::var("FOODSHARE_BACKEND_URL")
            .unwrap_or_else(|_| "http://localhost:5000/api".to_string())
            .trim_end_matches('/')
            .to_string();

        let request_timeout = env::var("FOODSHARE_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));

        let share_base_url = env::var("FOODSHARE_SHARE_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:5173".to_string())
            .trim_end_matches('/')
            .to_string();

        let log_level = env::var("FOODSHARE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Self {
            backend_url,
            cloudinary_cloud_name: non_empty_var("FOODSHARE_CLOUDINARY_CLOUD_NAME"),
            cloudinary_upload_preset: non_empty_var("FOODSHARE_CLOUDINARY_UPLOAD_PRESET"),
            cloudinary_api_key: non_empty_var("FOODSHARE_CLOUDINARY_API_KEY"),
            cloudinary_api_secret: non_empty_var("FOODSHARE_CLOUDINARY_API_SECRET"),
            id_token: non_empty_var("FOODSHARE_ID_TOKEN"),
            request_timeout,
            share_base_url,
            log_level,
        }
    }

    /// Image host settings, present only when uploads are possible.
    pub fn cloudinary(&self) -> Option<CloudinaryConfig> {
        let cloud_name = self.cloudinary_cloud_name.clone()?;
        let upload_preset = self.cloudinary_upload_preset.clone()?;
        Some(CloudinaryConfig {
            cloud_name,
            upload_preset,
            api_key: self.cloudinary_api_key.clone(),
            api_secret: self.cloudinary_api_secret.clone(),
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEYS: [&str; 9] = [
        "FOODSHARE_BACKEND_URL",
        "FOODSHARE_CLOUDINARY_CLOUD_NAME",
        "FOODSHARE_CLOUDINARY_UPLOAD_PRESET",
        "FOODSHARE_CLOUDINARY_API_KEY",
        "FOODSHARE_CLOUDINARY_API_SECRET",
        "FOODSHARE_ID_TOKEN",
        "FOODSHARE_REQUEST_TIMEOUT_SECS",
        "FOODSHARE_SHARE_BASE_URL",
        "FOODSHARE_LOG_LEVEL",
    ];

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        for key in KEYS {
            env::remove_var(key);
        }

        let config = Config::from_env();

        assert_eq!(config.backend_url, "http://localhost:5000/api");
        assert!(config.cloudinary_cloud_name.is_none());
        assert!(config.id_token.is_none());
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.share_base_url, "http://localhost:5173");
        assert_eq!(config.log_level, "info");
        assert!(config.cloudinary().is_none());
    }

    #[test]
    fn test_cloudinary_requires_name_and_preset() {
        let mut config = Config {
            backend_url: "http://backend".to_string(),
            cloudinary_cloud_name: Some("demo".to_string()),
            cloudinary_upload_preset: None,
            cloudinary_api_key: None,
            cloudinary_api_secret: None,
            id_token: None,
            request_timeout: Duration::from_secs(5),
            share_base_url: "http://app".to_string(),
            log_level: "warn".to_string(),
        };
        assert!(config.cloudinary().is_none());

        config.cloudinary_upload_preset = Some("unsigned".to_string());
        let cloudinary = config.cloudinary().unwrap();
        assert_eq!(cloudinary.cloud_name, "demo");
        assert!(cloudinary.api_secret.is_none());
    }
}
