use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    error::{ConfigError, Result},
    types::SubmissionKind,
};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_ANALYZE_PATH: &str = "/api/analyze";
pub const DEFAULT_ANALYZE_DOCUMENT_PATH: &str = "/api/analyze-document";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

pub const ENV_API_URL: &str = "VIRALSCOPE_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "VIRALSCOPE_TIMEOUT_SECS";

/// Where the analysis backend lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub analyze_path: String,
    pub analyze_document_path: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            analyze_path: DEFAULT_ANALYZE_PATH.to_string(),
            analyze_document_path: DEFAULT_ANALYZE_DOCUMENT_PATH.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    api_url: Option<String>,
    analyze_path: Option<String>,
    analyze_document_path: Option<String>,
    timeout_secs: Option<u64>,
}

/// Get the default config file location
pub fn get_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("viralscope")
        .join("config.json")
}

impl ClientConfig {
    /// Defaults, then the config file if present, then the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(&get_config_path(), |key| std::env::var(key).ok())
    }

    pub fn load_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if path.exists() {
            debug!(path = %path.display(), "reading config file");
            let content = std::fs::read_to_string(path)?;
            let file: ConfigFile =
                serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFile {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?;
            config.apply_file(file);
        }

        if let Some(url) = env(ENV_API_URL) {
            config.base_url = url;
        }
        if let Some(raw) = env(ENV_TIMEOUT_SECS) {
            match raw.trim().parse::<u64>() {
                Ok(secs) => config.timeout = Duration::from_secs(secs),
                Err(_) => warn!(value = %raw, "ignoring invalid {}", ENV_TIMEOUT_SECS),
            }
        }

        config.validate()?;
        Ok(config)
    }

    fn apply_file(&mut self, file: ConfigFile) {
        if let Some(url) = file.api_url {
            self.base_url = url;
        }
        if let Some(path) = file.analyze_path {
            self.analyze_path = path;
        }
        if let Some(path) = file.analyze_document_path {
            self.analyze_document_path = path;
        }
        if let Some(secs) = file.timeout_secs {
            self.timeout = Duration::from_secs(secs);
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }

        let url = reqwest::Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                reason: format!("unsupported scheme {}", url.scheme()),
            });
        }

        Ok(())
    }

    /// Full URL of the endpoint serving `kind` submissions.
    pub fn endpoint(&self, kind: SubmissionKind) -> String {
        let path = match kind {
            SubmissionKind::Youtube => &self.analyze_path,
            SubmissionKind::Document => &self.analyze_document_path,
        };
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::error::ViralscopeError;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn temp_config(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "viralscope-config-{}-{name}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn defaults_without_file_or_env() {
        let config = ClientConfig::load_from(Path::new("/nonexistent/config.json"), env_from(&[]))
            .unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(
            config.endpoint(SubmissionKind::Youtube),
            "http://localhost:8000/api/analyze"
        );
        assert_eq!(
            config.endpoint(SubmissionKind::Document),
            "http://localhost:8000/api/analyze-document"
        );
    }

    #[test]
    fn env_overrides_file() {
        let path = temp_config(
            "env-overrides",
            r#"{"api_url": "http://file:9000/", "timeout_secs": 5}"#,
        );
        let config = ClientConfig::load_from(
            &path,
            env_from(&[(ENV_API_URL, "https://env.example")]),
        )
        .unwrap();

        assert_eq!(config.base_url, "https://env.example");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn invalid_env_timeout_is_ignored() {
        let config = ClientConfig::load_from(
            Path::new("/nonexistent/config.json"),
            env_from(&[(ENV_TIMEOUT_SECS, "soon")]),
        )
        .unwrap();
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let result = ClientConfig::load_from(
            Path::new("/nonexistent/config.json"),
            env_from(&[(ENV_TIMEOUT_SECS, "0")]),
        );
        assert!(matches!(
            result,
            Err(ViralscopeError::Config(ConfigError::ZeroTimeout))
        ));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let path = temp_config("malformed", "{ not json");
        let result = ClientConfig::load_from(&path, env_from(&[]));
        assert!(matches!(
            result,
            Err(ViralscopeError::Config(ConfigError::InvalidFile { .. }))
        ));
    }

    #[test]
    fn non_http_base_url_is_rejected() {
        let config = ClientConfig::default().with_base_url("ftp://example.com");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn endpoint_joins_slashes_once() {
        let config = ClientConfig::default().with_base_url("http://api.local:8000/");
        assert_eq!(
            config.endpoint(SubmissionKind::Youtube),
            "http://api.local:8000/api/analyze"
        );
    }
}
