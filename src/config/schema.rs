use serde_json::{json, Value};
use std::sync::LazyLock;

pub static CONFIG_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "backend": {
                "type": "object",
                "properties": {
                    "base_url": { "type": "string", "pattern": "^https?://" },
                    "api_token": { "type": "string" },
                    "request_timeout_secs": { "type": "integer", "minimum": 1 },
                    "connect_timeout_secs": { "type": "integer", "minimum": 1 }
                }
            },
            "catalog": {
                "type": "object",
                "properties": {
                    "category": { "type": "string" },
                    "retries": { "type": "integer", "minimum": 0, "maximum": 10 },
                    "retry_base_delay_ms": { "type": "integer", "minimum": 0 }
                }
            },
            "generation": {
                "type": "object",
                "properties": {
                    "default_scope": { "$ref": "#/$defs/scope" },
                    "force_mode": { "type": "string", "enum": ["ai", "manual"] },
                    "include_appendix": { "type": "boolean" },
                    "include_ai_summary": { "type": "boolean" },
                    "include_benchmarking": { "type": "boolean" },
                    "language": { "type": "string", "minLength": 2 }
                }
            },
            "server": {
                "type": "object",
                "properties": {
                    "host": { "type": "string" },
                    "port": { "type": "integer", "minimum": 1, "maximum": 65535 },
                    "cors_origins": { "type": "array", "items": { "type": "string" } },
                    "session_ttl_secs": { "type": "integer", "minimum": 1 }
                }
            }
        },
        "$defs": {
            "scope": {
                "type": "string",
                "enum": [
                    "individual", "consolidated", "both",
                    "scanIndividual", "scanEcosystem", "scanBoth"
                ]
            }
        }
    })
});
