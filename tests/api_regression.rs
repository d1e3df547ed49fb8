//! API Regression Tests
//!
//! In-process tests that build the Axum app via `create_app()` and exercise
//! every endpoint using `tower::ServiceExt::oneshot()`.
//! No binary spawn, no network port.

use onegeo::api::{create_app, AppState};
use onegeo::config::ServerConfig;
use onegeo::services::Services;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

const BOUNDARY: &str = "onegeo-test-boundary";

const ALPHA_LAS: &str = "~Version Information
 VERS.   2.0 : CWLS LOG ASCII STANDARD - VERSION 2.0
 WRAP.   NO  : ONE LINE PER DEPTH STEP
~Well Information
 STRT.M  1000.0  :
 STOP.M  1002.0  :
 STEP.M  0.5     :
 NULL.   -999.25 : NULL VALUE
 WELL.   ALPHA-1 : WELL NAME
~Curve Information
 DEPT.M     : DEPTH
 GR.GAPI    : GAMMA RAY
 RHOB.G/CC  : BULK DENSITY
 NPHI.V/V   : NEUTRON POROSITY
~ASCII
1000.0  85.0  2.20  -999.25
1000.5  88.0  2.25  -999.25
1001.0  90.0  2.18  -999.25
1001.5  92.0  2.22  -999.25
1002.0  95.0  2.21  -999.25
";

fn create_test_app() -> Router {
    create_app(AppState::new(&Services::ephemeral()), &ServerConfig::default())
}

fn multipart_body(filename: &str, content: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(filename: &str, content: &[u8]) -> Request<Body> {
    let body = multipart_body(filename, content);
    Request::builder()
        .method("POST")
        .uri("/api/wells/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap()
}

fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

/// Upload the sample well and return `(well_id, [(mnemonic, curve_id)])`.
async fn ingest_alpha(app: &Router) -> (u64, Vec<(String, u64)>) {
    let (status, body) = send(app, upload_request("alpha.las", ALPHA_LAS.as_bytes())).await;
    assert_eq!(status, StatusCode::OK, "upload failed: {body}");
    let well_id = body["well_id"].as_u64().unwrap();

    let (status, curves) = send(app, request("GET", &format!("/api/wells/{well_id}/curves"))).await;
    assert_eq!(status, StatusCode::OK);
    let curves = curves
        .as_array()
        .unwrap()
        .iter()
        .map(|c| {
            (
                c["mnemonic"].as_str().unwrap().to_string(),
                c["id"].as_u64().unwrap(),
            )
        })
        .collect();
    (well_id, curves)
}

fn curve_id(curves: &[(String, u64)], mnemonic: &str) -> u64 {
    curves
        .iter()
        .find(|(m, _)| m == mnemonic)
        .map(|(_, id)| *id)
        .unwrap()
}

#[tokio::test]
async fn test_root_and_health() {
    let app = create_test_app();

    let (status, body) = send(&app, request("GET", "/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "OneGeo backend is running");

    let (status, body) = send(&app, request("GET", "/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "in-memory");
    assert_eq!(body["wells"], 0);
}

#[tokio::test]
async fn test_upload_returns_summary() {
    let app = create_test_app();
    let (status, body) = send(&app, upload_request("alpha.las", ALPHA_LAS.as_bytes())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["duplicate"], false);
    assert_eq!(body["well_name"], "ALPHA-1");
    assert_eq!(body["curves_ingested"], 3);
    assert_eq!(body["measurements_inserted"], 15);
}

#[tokio::test]
async fn test_reupload_is_duplicate() {
    let app = create_test_app();
    let (well_id, _) = ingest_alpha(&app).await;

    let (status, body) = send(&app, upload_request("alpha.las", b"~C\n DEPT.M :\n X. :\n~A\n1 2\n")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["duplicate"], true);
    assert_eq!(body["well_id"], well_id);
    assert_eq!(body["message"], "File already uploaded.");

    let (_, wells) = send(&app, request("GET", "/api/wells")).await;
    assert_eq!(wells.as_array().unwrap().len(), 1);
    assert_eq!(wells[0]["original_filename"], "alpha.las");
}

#[tokio::test]
async fn test_upload_rejections() {
    let app = create_test_app();

    let (status, body) = send(&app, upload_request("alpha.csv", ALPHA_LAS.as_bytes())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Only LAS files are allowed.");
    assert_eq!(body["code"], "BAD_REQUEST");

    let (status, body) = send(&app, upload_request("empty.las", b"")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Uploaded file is empty.");

    let (status, _) = send(&app, upload_request("junk.las", b"this is not a log")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Failed uploads leave nothing behind
    let (_, wells) = send(&app, request("GET", "/api/wells")).await;
    assert!(wells.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_accepts_uppercase_extension() {
    let app = create_test_app();
    let (status, body) = send(&app, upload_request("ALPHA.LAS", ALPHA_LAS.as_bytes())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["duplicate"], false);
}

#[tokio::test]
async fn test_upload_over_limit() {
    let server = ServerConfig {
        max_upload_bytes: 64,
        ..ServerConfig::default()
    };
    let app = create_app(AppState::new(&Services::ephemeral()), &server);

    let resp = app
        .oneshot(upload_request("alpha.las", ALPHA_LAS.as_bytes()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_curves_for_unknown_well_is_404() {
    let app = create_test_app();
    let (status, body) = send(&app, request("GET", "/api/wells/42/curves")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "No curves found for this well.");

    let (status, _) = send(&app, request("GET", "/api/wells/abc/curves")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_curve_data_window() {
    let app = create_test_app();
    let (_, curves) = ingest_alpha(&app).await;
    let gr = curve_id(&curves, "GR");

    let (status, body) = send(
        &app,
        request("GET", &format!("/api/curves/{gr}/data?min_depth=1000.5&max_depth=1001.5")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let depths: Vec<f64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["depth"].as_f64().unwrap())
        .collect();
    assert_eq!(depths, vec![1000.5, 1001.0, 1001.5]);
    assert_eq!(body[0]["value"], 88.0);
}

#[tokio::test]
async fn test_curve_data_keeps_nulls() {
    let app = create_test_app();
    let (_, curves) = ingest_alpha(&app).await;
    let nphi = curve_id(&curves, "NPHI");

    let (status, body) = send(
        &app,
        request("GET", &format!("/api/curves/{nphi}/data?min_depth=0&max_depth=5000")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 5);
    assert!(body[0]["value"].is_null());
}

#[tokio::test]
async fn test_curve_data_errors() {
    let app = create_test_app();
    let (_, curves) = ingest_alpha(&app).await;
    let gr = curve_id(&curves, "GR");

    let (status, body) = send(
        &app,
        request("GET", &format!("/api/curves/{gr}/data?min_depth=1002&max_depth=1000")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "min_depth cannot be greater than max_depth.");

    let (status, body) = send(
        &app,
        request("GET", &format!("/api/curves/{gr}/data?min_depth=3000&max_depth=4000")),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "No data found for given range.");

    let (status, body) = send(&app, request("GET", &format!("/api/curves/{gr}/data"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_interpret_gamma_ray() {
    let app = create_test_app();
    let (_, curves) = ingest_alpha(&app).await;
    let gr = curve_id(&curves, "GR");

    let (status, body) = send(
        &app,
        request("POST", &format!("/api/interpret?curve_id={gr}&min_depth=1000&max_depth=1002")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["curve"], "GR");
    assert_eq!(body["statistics"]["count"], 5);
    assert_eq!(body["statistics"]["min"], 85.0);
    assert_eq!(body["statistics"]["max"], 95.0);
    assert_eq!(body["statistics"]["average"], 90.0);
    assert_eq!(body["statistics"]["std_dev"], 3.41);
    assert_eq!(
        body["interpretation"],
        serde_json::json!([
            "Low variability suggests stable formation properties.",
            "Increasing trend detected across selected depth range.",
            "Gamma ray levels suggest shale-rich lithology.",
        ])
    );
}

#[tokio::test]
async fn test_interpret_density_is_porous() {
    let app = create_test_app();
    let (_, curves) = ingest_alpha(&app).await;
    let rhob = curve_id(&curves, "RHOB");

    let (status, body) = send(
        &app,
        request("POST", &format!("/api/interpret?curve_id={rhob}&min_depth=1000&max_depth=1002")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let notes = body["interpretation"].as_array().unwrap();
    assert_eq!(
        notes.last().unwrap(),
        "Lower density may indicate porous formation."
    );
}

#[tokio::test]
async fn test_interpret_errors() {
    let app = create_test_app();
    let (_, curves) = ingest_alpha(&app).await;
    let nphi = curve_id(&curves, "NPHI");

    let (status, body) = send(
        &app,
        request("POST", &format!("/api/interpret?curve_id={nphi}&min_depth=1000&max_depth=1002")),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "No valid measurement values.");

    let (status, body) = send(
        &app,
        request("POST", "/api/interpret?curve_id=999&min_depth=0&max_depth=1"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Curve not found.");

    let (status, _) = send(
        &app,
        request("POST", &format!("/api/interpret?curve_id={nphi}&min_depth=5&max_depth=1")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, request("POST", "/api/interpret?curve_id=1")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_well_cascades() {
    let app = create_test_app();
    let (well_id, curves) = ingest_alpha(&app).await;
    let gr = curve_id(&curves, "GR");

    let (status, body) = send(&app, request("DELETE", &format!("/api/wells/{well_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], well_id);

    let (status, _) = send(&app, request("GET", &format!("/api/wells/{well_id}/curves"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        request("GET", &format!("/api/curves/{gr}/data?min_depth=0&max_depth=5000")),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, request("DELETE", &format!("/api/wells/{well_id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The filename is free again
    let (status, body) = send(&app, upload_request("alpha.las", ALPHA_LAS.as_bytes())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["duplicate"], false);
}
