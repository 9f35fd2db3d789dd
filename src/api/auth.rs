use axum::{
    extract::Request,
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use serde_json::{json, Value};

/// Bridge token; when unset or empty the bridge is open.
pub const API_TOKEN_ENV: &str = "REPORTCTL_API_TOKEN";

pub async fn api_auth_middleware(
    request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<Value>)> {
    let expected = std::env::var(API_TOKEN_ENV).ok();
    let header = request.headers().get(AUTHORIZATION).and_then(|v| v.to_str().ok());

    check_bearer(expected.as_deref(), header)
        .map_err(|message| (StatusCode::UNAUTHORIZED, Json(json!({ "error": message }))))?;
    Ok(next.run(request).await)
}

pub fn check_bearer(expected: Option<&str>, header: Option<&str>) -> Result<(), &'static str> {
    let Some(expected) = expected.filter(|t| !t.is_empty()) else {
        return Ok(());
    };
    match header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) if token == expected => Ok(()),
        Some(_) => Err("Invalid API token"),
        None => Err("Missing Authorization header"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_when_no_token_configured() {
        assert!(check_bearer(None, None).is_ok());
        assert!(check_bearer(Some(""), None).is_ok());
    }

    #[test]
    fn test_bearer_checked() {
        assert!(check_bearer(Some("s3cret"), Some("Bearer s3cret")).is_ok());
        assert_eq!(check_bearer(Some("s3cret"), Some("Bearer nope")), Err("Invalid API token"));
        assert_eq!(check_bearer(Some("s3cret"), Some("Basic abc")), Err("Missing Authorization header"));
        assert_eq!(check_bearer(Some("s3cret"), None), Err("Missing Authorization header"));
    }
}
