//! API route definitions
//!
//! - `/` and `/health`: liveness
//! - `/api/wells/*`: upload, list, curves, delete
//! - `/api/curves/:curve_id/data`: depth-window reads
//! - `/api/interpret`: curve interpretation

use axum::{
    routing::{delete, get, post},
    Router,
};

use super::handlers::{self, AppState};

/// Well, curve and interpretation routes under `/api`
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/wells/upload", post(handlers::upload_well))
        .route("/wells", get(handlers::list_wells))
        .route("/wells/:well_id", delete(handlers::delete_well))
        .route("/wells/:well_id/curves", get(handlers::list_curves))
        .route("/curves/:curve_id/data", get(handlers::curve_data))
        .route("/interpret", post(handlers::interpret))
        .with_state(state)
}

/// Root banner and health check
pub fn status_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .with_state(state)
}
