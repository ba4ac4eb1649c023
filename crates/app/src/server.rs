//! HTTP API: one detection endpoint plus a health probe.
//!
//! `POST /api/detect-error/` takes `{technique, data, generator?,
//! introduce_error?}` and answers with the serialized detection result.
//! Field validation failures, including wrongly typed fields, return 400
//! with a field-to-messages map. A body that is not JSON returns 400 with
//! `{"detail": message}`. Engine failures return 500 with
//! `{"error": message}`.

use axum::{
    body::Bytes,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::validate::parse_request;

/// Build the API router.
pub fn router() -> Router {
    Router::new()
        .route("/api/detect-error/", post(detect_error))
        .route("/api/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("errdetect API listening on {}", listener.local_addr()?);
    axum::serve(listener, router()).await?;
    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

async fn detect_error(body: Bytes) -> Response {
    let body: Value = match serde_json::from_slice(&body) {
        Ok(body) => body,
        Err(err) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "detail": format!("JSON parse error - {}", err) })),
            )
                .into_response()
        }
    };

    let valid = match parse_request(&body) {
        Ok(valid) => valid,
        Err(errors) => return (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
    };

    match errdetect_core::run(&valid.technique, &valid.data, valid.introduce_error) {
        Ok(result) => {
            info!(
                technique = valid.technique.name(),
                bits = valid.data.len(),
                error_detected = result.error_detected,
                "detection complete"
            );
            (StatusCode::OK, Json(result)).into_response()
        }
        Err(err) => {
            error!(technique = valid.technique.name(), error = %err, "engine failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": err.to_string() })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    async fn post_json(body: Value) -> (StatusCode, Value) {
        post_raw(Some("application/json"), body.to_string()).await
    }

    async fn post_raw(content_type: Option<&str>, body: String) -> (StatusCode, Value) {
        let mut request = Request::builder().method("POST").uri("/api/detect-error/");
        if let Some(content_type) = content_type {
            request = request.header("content-type", content_type);
        }
        let response = router()
            .oneshot(request.body(Body::from(body)).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let response = router()
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"ok");
    }

    #[tokio::test]
    async fn test_detect_vrc_with_error() {
        let (status, body) = post_json(json!({
            "technique": "vrc",
            "data": "1001001",
            "introduce_error": true
        }))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["transmitted_data"], "10010011");
        assert_eq!(body["received_data"], "00010011");
        assert_eq!(body["error_detected"], true);
        assert_eq!(body["steps"][0]["title"], "Start VRC");
    }

    #[tokio::test]
    async fn test_detect_crc_custom_generator() {
        let (status, body) = post_json(json!({
            "technique": "crc",
            "data": "1101011011",
            "generator": "10011"
        }))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["transmitted_data"], "11010110111110");
        assert_eq!(body["error_detected"], false);
    }

    #[tokio::test]
    async fn test_validation_errors() {
        let (status, body) = post_json(json!({
            "technique": "checksum",
            "data": "10201"
        }))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["data"][0], "Data must contain only 0s and 1s.");

        let (status, body) = post_json(json!({ "data": "1011" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["technique"][0], "This field is required.");
    }

    #[tokio::test]
    async fn test_wrongly_typed_field() {
        let (status, body) = post_json(json!({
            "technique": "vrc",
            "data": "1011",
            "introduce_error": "yes"
        }))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["introduce_error"][0], "Must be a valid boolean.");
        assert!(body.get("technique").is_none());
    }

    #[tokio::test]
    async fn test_blank_data() {
        let (status, body) = post_json(json!({ "technique": "lrc", "data": "" })).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["data"][0], "This field may not be blank.");
    }

    #[tokio::test]
    async fn test_body_without_content_type() {
        let body = json!({ "technique": "crc", "data": "1011" }).to_string();
        let (status, body) = post_raw(None, body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error_detected"], false);
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let body = "{\"technique\":".to_string();
        let (status, body) = post_raw(Some("application/json"), body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"]
            .as_str()
            .unwrap()
            .starts_with("JSON parse error"));
    }

    #[tokio::test]
    async fn test_cors_headers() {
        let response = router()
            .oneshot(
                Request::get("/api/health")
                    .header("origin", "http://localhost:3000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response
            .headers()
            .contains_key("access-control-allow-origin"));
    }
}
