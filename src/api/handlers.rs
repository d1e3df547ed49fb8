//! API request handlers
//!
//! Store access is synchronous, so every handler that touches the store runs
//! its work on the blocking pool.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tracing::{error, info};

use super::envelope::ApiErrorResponse;
use crate::catalog::Catalog;
use crate::error::Classify;
use crate::ingestion::IngestionPipeline;
use crate::interpretation::InterpretationEngine;
use crate::services::Services;
use crate::types::{EntityId, Measurement};

// ============================================================================
// Shared State
// ============================================================================

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: IngestionPipeline,
    pub engine: InterpretationEngine,
    pub catalog: Catalog,
    pub storage_backend: &'static str,
}

impl AppState {
    pub fn new(services: &Services) -> Self {
        Self {
            pipeline: services.pipeline(),
            engine: services.engine(),
            catalog: services.catalog(),
            storage_backend: services.store.backend_name(),
        }
    }
}

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct DepthQuery {
    pub min_depth: f64,
    pub max_depth: f64,
}

#[derive(Debug, Deserialize)]
pub struct InterpretQuery {
    pub curve_id: EntityId,
    pub min_depth: f64,
    pub max_depth: f64,
}

/// One row of `GET /api/curves/:curve_id/data`
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct MeasurementPoint {
    pub depth: f64,
    pub value: Option<f64>,
}

impl From<Measurement> for MeasurementPoint {
    fn from(m: Measurement) -> Self {
        Self {
            depth: m.depth,
            value: m.value,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub storage: &'static str,
    pub status: &'static str,
    pub wells: usize,
}

// ============================================================================
// Helpers
// ============================================================================

/// Run store-bound work on the blocking pool and map its error.
async fn blocking<T, E, F>(work: F) -> Result<T, Response>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Classify + Display + Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(ApiErrorResponse::from_error(&e)),
        Err(e) => {
            error!(error = %e, "Blocking task failed");
            Err(ApiErrorResponse::internal("Internal server error."))
        }
    }
}

fn multipart_error(err: &MultipartError) -> Response {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiErrorResponse::payload_too_large(err.body_text())
    } else {
        ApiErrorResponse::bad_request(err.body_text())
    }
}

fn has_las_extension(filename: &str) -> bool {
    std::path::Path::new(filename)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("las"))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /
pub async fn root() -> Response {
    Json(serde_json::json!({ "message": "OneGeo backend is running" })).into_response()
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Response {
    let catalog = state.catalog.clone();
    match blocking(move || catalog.well_count()).await {
        Ok(wells) => Json(HealthResponse {
            storage: state.storage_backend,
            status: "ok",
            wells,
        })
        .into_response(),
        Err(resp) => resp,
    }
}

/// POST /api/wells/upload (multipart field `file`)
pub async fn upload_well(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let mut multipart = match multipart {
        Ok(m) => m,
        Err(rejection) => return ApiErrorResponse::bad_request(rejection.body_text()),
    };

    let (filename, content) = loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return ApiErrorResponse::bad_request("No file provided."),
            Err(e) => return multipart_error(&e),
        };
        if field.name() != Some("file") {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            return ApiErrorResponse::bad_request("No file provided.");
        };
        if !has_las_extension(&filename) {
            return ApiErrorResponse::bad_request("Only LAS files are allowed.");
        }
        match field.bytes().await {
            Ok(bytes) => break (filename, bytes),
            Err(e) => return multipart_error(&e),
        }
    };

    info!(filename = %filename, bytes = content.len(), "Upload received");
    match state.pipeline.ingest(&filename, content.to_vec()).await {
        Ok(outcome) => Json(outcome).into_response(),
        Err(e) => ApiErrorResponse::from_error(&e),
    }
}

/// GET /api/wells
pub async fn list_wells(State(state): State<AppState>) -> Response {
    let catalog = state.catalog;
    match blocking(move || catalog.list_wells()).await {
        Ok(wells) => Json(wells).into_response(),
        Err(resp) => resp,
    }
}

/// GET /api/wells/:well_id/curves
pub async fn list_curves(
    State(state): State<AppState>,
    well_id: Result<Path<EntityId>, PathRejection>,
) -> Response {
    let Path(well_id) = match well_id {
        Ok(p) => p,
        Err(rejection) => return ApiErrorResponse::bad_request(rejection.body_text()),
    };
    let catalog = state.catalog;
    match blocking(move || catalog.list_curves(well_id)).await {
        Ok(curves) => Json(curves).into_response(),
        Err(resp) => resp,
    }
}

/// DELETE /api/wells/:well_id
pub async fn delete_well(
    State(state): State<AppState>,
    well_id: Result<Path<EntityId>, PathRejection>,
) -> Response {
    let Path(well_id) = match well_id {
        Ok(p) => p,
        Err(rejection) => return ApiErrorResponse::bad_request(rejection.body_text()),
    };
    let catalog = state.catalog;
    match blocking(move || catalog.delete_well(well_id)).await {
        Ok(()) => Json(serde_json::json!({ "deleted": well_id })).into_response(),
        Err(resp) => resp,
    }
}

/// GET /api/curves/:curve_id/data?min_depth=..&max_depth=..
pub async fn curve_data(
    State(state): State<AppState>,
    curve_id: Result<Path<EntityId>, PathRejection>,
    query: Result<Query<DepthQuery>, QueryRejection>,
) -> Response {
    let Path(curve_id) = match curve_id {
        Ok(p) => p,
        Err(rejection) => return ApiErrorResponse::bad_request(rejection.body_text()),
    };
    let Query(q) = match query {
        Ok(q) => q,
        Err(rejection) => return ApiErrorResponse::bad_request(rejection.body_text()),
    };

    let catalog = state.catalog;
    match blocking(move || catalog.curve_data(curve_id, q.min_depth, q.max_depth)).await {
        Ok(rows) => {
            let points: Vec<MeasurementPoint> = rows.into_iter().map(Into::into).collect();
            Json(points).into_response()
        }
        Err(resp) => resp,
    }
}

/// POST /api/interpret?curve_id=..&min_depth=..&max_depth=..
pub async fn interpret(
    State(state): State<AppState>,
    query: Result<Query<InterpretQuery>, QueryRejection>,
) -> Response {
    let Query(q) = match query {
        Ok(q) => q,
        Err(rejection) => return ApiErrorResponse::bad_request(rejection.body_text()),
    };

    let engine = state.engine;
    match blocking(move || engine.interpret(q.curve_id, q.min_depth, q.max_depth)).await {
        Ok(report) => Json(report).into_response(),
        Err(resp) => resp,
    }
}
