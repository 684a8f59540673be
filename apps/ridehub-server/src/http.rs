//! Outer HTTP stack around the ridehub routes.

use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, HeaderValue, Method, StatusCode, header};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

/// Layers run outermost first: trace, CORS, timeout, body limit.
pub fn apply_layers(router: Router, cfg: &ServerConfig) -> Router {
    let mut router = router
        .layer(DefaultBodyLimit::max(cfg.body_limit_bytes))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::GATEWAY_TIMEOUT,
            Duration::from_secs(cfg.request_timeout_secs),
        ));
    if let Some(cors) = build_cors_layer(&cfg.cors_allowed_origins) {
        router = router.layer(cors);
    }
    router.layer(TraceLayer::new_for_http())
}

fn build_cors_layer(origins: &[String]) -> Option<CorsLayer> {
    if origins.is_empty() {
        return None;
    }

    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-user-id"),
        ]);

    if origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS allows any origin");
        return Some(layer.allow_origin(Any));
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    Some(layer.allow_origin(allowed))
}

#[cfg(test)]
mod tests {
    use super::build_cors_layer;

    #[test]
    fn cors_is_off_without_origins() {
        assert!(build_cors_layer(&[]).is_none());
        assert!(build_cors_layer(&["*".to_owned()]).is_some());
        assert!(build_cors_layer(&["https://ridehub.app".to_owned()]).is_some());
    }
}
