//! REST API module using Axum
//!
//! Plain JSON bodies; errors use the [`envelope::ApiErrorResponse`] shape.

pub mod envelope;
pub mod handlers;
mod routes;

pub use handlers::AppState;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

/// CORS is same-origin only unless `server.cors_origins` lists origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if origins.is_empty() {
        return layer;
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| o.trim().parse().ok())
        .collect();
    tracing::info!(origins = ?origins, "CORS: allowing configured origins");
    layer.allow_origin(allowed)
}

/// Create the complete application router.
pub fn create_app(state: AppState, server: &ServerConfig) -> Router {
    Router::new()
        .nest("/api", routes::api_routes(state.clone()))
        .merge(routes::status_routes(state))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(server.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(&server.cors_origins))
}
