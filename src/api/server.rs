// API Server Implementation

use crate::api::{config::ApiConfig, middleware, routes, state::AppState};
use crate::checker::CertificateChecker;
use anyhow::Result;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tracing::info;

/// API Server
pub struct ApiServer {
    config: ApiConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    /// Create new API server around a configured checker
    pub fn new(config: ApiConfig, checker: CertificateChecker) -> Self {
        let state = Arc::new(AppState::new(config.clone(), checker));
        Self { config, state }
    }

    /// Build the router
    pub fn build_router(&self) -> Router {
        let api_routes = Router::new()
            .route("/check-cert", post(routes::check::check_certificate))
            .route("/match-key", post(routes::keys::match_key))
            .route("/plan/status", get(routes::plan::plan_status))
            .route("/cadence/:token", get(routes::cadence::cadence))
            .route("/health", get(routes::health::health_check));

        let router = Router::new()
            .nest("/api/v1", api_routes)
            // Also support /health at root level
            .route("/health", get(routes::health::health_check))
            .layer(axum_middleware::from_fn_with_state(
                self.state.config.clone(),
                middleware::authenticate,
            ))
            .layer(DefaultBodyLimit::max(self.config.max_body_size));

        let router = if !self.config.enable_cors {
            router
        } else if self.config.cors_origins.is_empty() {
            router.layer(middleware::cors_layer())
        } else {
            router.layer(middleware::cors_layer_with_origins(&self.config.cors_origins))
        };

        router
            .layer(middleware::logging_layer())
            .with_state(self.state.clone())
    }

    /// Run the server
    pub async fn run(self) -> Result<()> {
        let app = self.build_router();

        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        info!("certwarden API server listening on {}", addr);
        info!("Health check endpoint: http://{}/health", addr);

        axum::serve(listener, app).await?;

        Ok(())
    }

    /// Get the application state
    pub fn state(&self) -> Arc<AppState> {
        self.state.clone()
    }
}
