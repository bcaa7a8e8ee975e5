use axum::http::{HeaderValue, Method, header};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Restricted CORS layer for the given origins.
///
/// Allows the usual REST verbs, JSON/Authorization/Cookie headers and
/// credentials, with a 1 hour preflight cache.
pub fn create_cors_layer(allowed_origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::COOKIE,
        ])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

/// Allows any origin. Development only.
pub fn create_permissive_cors_layer() -> CorsLayer {
    CorsLayer::permissive()
}

/// Parses a comma-separated origin list, skipping blanks.
pub fn parse_origins(raw: &str) -> Result<Vec<HeaderValue>, axum::http::header::InvalidHeaderValue> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(HeaderValue::from_str)
        .collect()
}

/// CORS layer from `CORS_ALLOWED_ORIGIN`; permissive when unset or empty.
pub fn cors_layer_from_env() -> std::io::Result<CorsLayer> {
    let Ok(raw) = std::env::var("CORS_ALLOWED_ORIGIN") else {
        tracing::warn!("CORS_ALLOWED_ORIGIN not set, allowing any origin");
        return Ok(create_permissive_cors_layer());
    };

    let origins = parse_origins(&raw).map_err(|e| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("Invalid CORS_ALLOWED_ORIGIN value: {e}"),
        )
    })?;

    if origins.is_empty() {
        tracing::warn!("CORS_ALLOWED_ORIGIN is empty, allowing any origin");
        return Ok(create_permissive_cors_layer());
    }

    tracing::info!(origins = %raw, "CORS configured");
    Ok(create_cors_layer(origins))
}
