use std::time::Duration;

use serde::{Deserialize, Serialize};
use crate::errors::{ReportError, RetryConfig};
use crate::models::{ForceMode, GenerationOptions, ReportScope};

/// Environment variable holding the backend API token.
pub const BACKEND_TOKEN_ENV: &str = "REPORTCTL_BACKEND_TOKEN";

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ReportctlConfig {
    pub backend: Option<BackendConfig>,
    pub catalog: Option<CatalogConfig>,
    pub generation: Option<GenerationConfig>,
    pub server: Option<ServerConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct BackendConfig {
    pub base_url: Option<String>,
    /// Prefer `REPORTCTL_BACKEND_TOKEN` over storing the token in the file.
    pub api_token: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub connect_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct CatalogConfig {
    pub category: Option<String>,
    pub retries: Option<u32>,
    pub retry_base_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct GenerationConfig {
    pub default_scope: Option<ReportScope>,
    pub force_mode: Option<ForceMode>,
    pub include_appendix: Option<bool>,
    pub include_ai_summary: Option<bool>,
    pub include_benchmarking: Option<bool>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub cors_origins: Option<Vec<String>>,
    /// Sessions untouched for this long are dropped by the bridge.
    pub session_ttl_secs: Option<u64>,
}

/// Resolved connection settings for the backend client.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub api_token: Option<String>,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub catalog_retries: u32,
}

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";
pub const DEFAULT_SERVER_PORT: u16 = 8787;
pub const DEFAULT_SESSION_TTL_SECS: u64 = 3600;

impl ReportctlConfig {
    /// Merge command-line overrides over the file. Token precedence: flag, environment, file.
    pub fn client_settings(
        &self,
        base_url: Option<&str>,
        api_token: Option<&str>,
    ) -> Result<ClientSettings, ReportError> {
        let backend = self.backend.clone().unwrap_or_default();
        let base_url = base_url
            .map(String::from)
            .or(backend.base_url)
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| {
                ReportError::Config("No backend URL configured. Pass --base-url or set backend.base_url".into())
            })?;
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ReportError::Config(format!(
                "Backend URL must start with http:// or https://, got '{}'",
                base_url
            )));
        }

        let api_token = api_token
            .map(String::from)
            .or_else(|| std::env::var(BACKEND_TOKEN_ENV).ok())
            .or(backend.api_token)
            .filter(|t| !t.trim().is_empty());

        Ok(ClientSettings {
            base_url,
            api_token,
            request_timeout: Duration::from_secs(
                backend.request_timeout_secs.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            ),
            connect_timeout: Duration::from_secs(
                backend.connect_timeout_secs.unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
            ),
            catalog_retries: self.retry_config().max_retries,
        })
    }

    pub fn retry_config(&self) -> RetryConfig {
        let defaults = RetryConfig::default();
        let catalog = self.catalog.as_ref();
        RetryConfig {
            max_retries: catalog.and_then(|c| c.retries).unwrap_or(defaults.max_retries),
            base_delay: catalog
                .and_then(|c| c.retry_base_delay_ms)
                .map(Duration::from_millis)
                .unwrap_or(defaults.base_delay),
        }
    }

    pub fn default_category(&self) -> Option<String> {
        self.catalog.as_ref().and_then(|c| c.category.clone())
    }

    pub fn default_scope(&self) -> ReportScope {
        self.generation
            .as_ref()
            .and_then(|g| g.default_scope)
            .unwrap_or(ReportScope::Individual)
    }

    /// Generation options with file values applied over the defaults.
    pub fn generation_options(&self) -> GenerationOptions {
        let mut options = GenerationOptions::default();
        if let Some(g) = &self.generation {
            options.force_mode = g.force_mode;
            if let Some(v) = g.include_appendix {
                options.include_appendix = v;
            }
            if let Some(v) = g.include_ai_summary {
                options.include_ai_summary = v;
            }
            if let Some(v) = g.include_benchmarking {
                options.include_benchmarking = v;
            }
            if let Some(lang) = g.language.as_ref().filter(|l| !l.trim().is_empty()) {
                options.language = lang.clone();
            }
        }
        options
    }

    pub fn server_addr(&self, host: Option<&str>, port: Option<u16>) -> String {
        let server = self.server.clone().unwrap_or_default();
        let host = host.map(String::from).or(server.host).unwrap_or_else(|| DEFAULT_SERVER_HOST.into());
        let port = port.or(server.port).unwrap_or(DEFAULT_SERVER_PORT);
        format!("{}:{}", host, port)
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.server.as_ref().and_then(|s| s.cors_origins.clone()).unwrap_or_default()
    }

    pub fn session_ttl(&self) -> Duration {
        let secs = self
            .server
            .as_ref()
            .and_then(|s| s.session_ttl_secs)
            .unwrap_or(DEFAULT_SESSION_TTL_SECS);
        Duration::from_secs(secs)
    }
}
