use std::path::Path;
use crate::errors::ReportError;
use super::schema::CONFIG_SCHEMA;
use super::security::lint_config;
use super::types::ReportctlConfig;
use tracing::{debug, warn};

const MAX_CONFIG_BYTES: u64 = 256 * 1024;

pub async fn parse_config(path: &Path) -> Result<ReportctlConfig, ReportError> {
    if !path.exists() {
        return Err(ReportError::Config(format!("Config file not found: {}", path.display())));
    }

    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() > MAX_CONFIG_BYTES {
        return Err(ReportError::Config(format!(
            "Config file {} exceeds {} KiB",
            path.display(),
            MAX_CONFIG_BYTES / 1024
        )));
    }

    let content = tokio::fs::read_to_string(path).await?;
    let config = parse_config_str(&content)?;
    debug!(path = %path.display(), "Config loaded");
    Ok(config)
}

/// Lint, schema-check, deserialize and cross-check a YAML document.
pub fn parse_config_str(content: &str) -> Result<ReportctlConfig, ReportError> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(content)?;
    if yaml.is_null() {
        return Ok(ReportctlConfig::default());
    }

    lint_config(&yaml)?;
    for warning in schema_warnings(&yaml)? {
        warn!(validation_error = %warning, "Config schema warning");
    }

    let config: ReportctlConfig = serde_yaml::from_value(yaml)?;
    validate_semantics(&config)?;
    Ok(config)
}

/// Schema violations are advisory: they are reported, and typed parsing decides.
pub fn schema_warnings(yaml: &serde_yaml::Value) -> Result<Vec<String>, ReportError> {
    let json_value = serde_json::to_value(yaml)
        .map_err(|e| ReportError::Config(format!("Config conversion error: {}", e)))?;
    let compiled = jsonschema::JSONSchema::compile(&CONFIG_SCHEMA)
        .map_err(|e| ReportError::Config(format!("Schema compilation error: {}", e)))?;

    let warnings = match compiled.validate(&json_value) {
        Ok(()) => Vec::new(),
        Err(errors) => errors.map(|e| format!("{} at {}", e, e.instance_path)).collect(),
    };
    Ok(warnings)
}

fn validate_semantics(config: &ReportctlConfig) -> Result<(), ReportError> {
    if let Some(backend) = &config.backend {
        if backend.request_timeout_secs == Some(0) || backend.connect_timeout_secs == Some(0) {
            return Err(ReportError::Config("Backend timeouts must be at least one second".into()));
        }
        if let (Some(request), Some(connect)) = (backend.request_timeout_secs, backend.connect_timeout_secs) {
            if connect > request {
                warn!(connect, request, "Connect timeout exceeds the request timeout");
            }
        }
    }

    if let Some(server) = &config.server {
        if server.port == Some(0) {
            return Err(ReportError::Config("server.port must be between 1 and 65535".into()));
        }
        if server.session_ttl_secs == Some(0) {
            return Err(ReportError::Config("server.session_ttl_secs must be at least one second".into()));
        }
        let wildcard = server.cors_origins.as_ref().is_some_and(|o| o.iter().any(|o| o == "*"));
        let public = server.host.as_deref().is_some_and(|h| h == "0.0.0.0" || h == "::");
        if wildcard && public {
            warn!("Bridge listens on all interfaces with a wildcard CORS origin");
        }
    }

    if let Some(generation) = &config.generation {
        if generation.include_ai_summary == Some(false)
            && generation.force_mode == Some(crate::models::ForceMode::Ai)
        {
            return Err(ReportError::Config(
                "generation.force_mode 'ai' conflicts with include_ai_summary: false".into(),
            ));
        }
    }

    Ok(())
}
