//! Error responses.
//!
//! Successful responses are plain JSON bodies. Every error response is
//! `{ "detail": "...", "code": "..." }` with a status taken from the
//! error's [`ErrorClass`].

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt::Display;

use crate::error::{Classify, ErrorClass};

/// Error body: `{ "detail": "...", "code": "..." }`
#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    pub detail: String,
    pub code: &'static str,
}

impl ApiErrorResponse {
    fn build(status: StatusCode, code: &'static str, msg: impl Into<String>) -> Response {
        let body = Self {
            detail: msg.into(),
            code,
        };
        (status, axum::Json(body)).into_response()
    }

    pub fn not_found(msg: impl Into<String>) -> Response {
        Self::build(StatusCode::NOT_FOUND, "NOT_FOUND", msg)
    }

    pub fn bad_request(msg: impl Into<String>) -> Response {
        Self::build(StatusCode::BAD_REQUEST, "BAD_REQUEST", msg)
    }

    pub fn payload_too_large(msg: impl Into<String>) -> Response {
        Self::build(StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg)
    }

    pub fn internal(msg: impl Into<String>) -> Response {
        Self::build(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg)
    }

    /// Map a domain error by class. Infrastructure details are logged and
    /// replaced with a generic message.
    pub fn from_error<E: Classify + Display>(err: &E) -> Response {
        match err.class() {
            ErrorClass::InvalidInput => Self::bad_request(err.to_string()),
            ErrorClass::NotFound => Self::not_found(err.to_string()),
            ErrorClass::Infrastructure => {
                tracing::error!(error = %err, "Request failed");
                Self::internal("Internal server error.")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogError;
    use crate::storage::StoreError;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_error_response_shape() {
        let resp = ApiErrorResponse::not_found("gone");
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let v = body_json(resp).await;
        assert_eq!(v["detail"], "gone");
        assert_eq!(v["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_from_error_uses_class() {
        let resp = ApiErrorResponse::from_error(&CatalogError::NoData);
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(resp).await["detail"], "No data found for given range.");

        let resp = ApiErrorResponse::from_error(&CatalogError::InvalidRange("bad".to_string()));
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_infrastructure_detail_hidden() {
        let err = CatalogError::Storage(StoreError::Database("disk on fire".to_string()));
        let resp = ApiErrorResponse::from_error(&err);
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let v = body_json(resp).await;
        assert_eq!(v["code"], "INTERNAL_ERROR");
        assert!(!v["detail"].as_str().unwrap().contains("disk"));
    }
}
