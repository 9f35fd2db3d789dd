use crate::errors::ReportError;
use tracing::warn;

/// Values that never belong in a report configuration.
const DANGEROUS_PATTERNS: &[&str] = &["<script", "javascript:", "vbscript:", "data:", "file:"];

/// Keys whose literal values should come from the environment instead.
const SECRET_KEYS: &[&str] = &["api_token"];

/// Reject injected markup or URI schemes anywhere in the document; warn on inline secrets.
pub fn lint_config(value: &serde_yaml::Value) -> Result<(), ReportError> {
    walk(value, &mut Vec::new())
}

fn walk(value: &serde_yaml::Value, path: &mut Vec<String>) -> Result<(), ReportError> {
    match value {
        serde_yaml::Value::String(s) => check_string(s, path),
        serde_yaml::Value::Mapping(map) => {
            for (k, v) in map {
                let key = k.as_str().unwrap_or("?").to_string();
                if SECRET_KEYS.contains(&key.as_str()) && v.as_str().is_some_and(|s| !s.is_empty()) {
                    warn!(key = %dotted(path, &key), "Secret stored in the config file; prefer the environment");
                }
                path.push(key);
                let result = walk(v, path);
                path.pop();
                result?;
            }
            Ok(())
        }
        serde_yaml::Value::Sequence(seq) => {
            for (i, v) in seq.iter().enumerate() {
                path.push(format!("[{}]", i));
                let result = walk(v, path);
                path.pop();
                result?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn check_string(s: &str, path: &[String]) -> Result<(), ReportError> {
    let lower = s.to_lowercase();
    match DANGEROUS_PATTERNS.iter().find(|p| lower.contains(*p)) {
        Some(pattern) => Err(ReportError::Config(format!(
            "Disallowed value '{}' at {}",
            pattern,
            if path.is_empty() { "root".to_string() } else { path.join(".") }
        ))),
        None => Ok(()),
    }
}

fn dotted(path: &[String], key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path.join("."), key)
    }
}
