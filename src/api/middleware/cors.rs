// CORS Middleware

use axum::http::Method;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// Permissive CORS layer, used when no origins are configured
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

/// CORS layer restricted to the configured origins
pub fn cors_layer_with_origins(origins: &[String]) -> CorsLayer {
    let allow_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allow_origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}
