use anyhow::{Context, Result, anyhow};
use bytes::Bytes;
use hyper::{Response, StatusCode, header};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, warn};

use shared::types::ErrorResponse;

use super::deliver_page::{HttpResponse, full};

/// Serialize any `Serialize` type and deliver it as a JSON response.
/// Handlers use this instead of building their own responses.
pub fn deliver_serialized_json<T: Serialize>(data: &T, status: StatusCode) -> Result<HttpResponse> {
    let json = serde_json::to_string(data).context("Failed to serialize response")?;

    debug!(
        "Delivering serialized JSON response, status: {}, size: {} bytes",
        status.as_u16(),
        json.len()
    );

    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(full(json))
        .map_err(|e| anyhow!("Failed to build JSON response: {}", e))
}

/// Delivers a JSON error response with the specified error code, message, and status.
pub fn deliver_error_json(error_code: &str, message: &str, status: StatusCode) -> Result<HttpResponse> {
    warn!(
        "Delivering error JSON: {} - {} ({})",
        status.as_u16(),
        error_code,
        message
    );

    deliver_serialized_json(&ErrorResponse::new(error_code, message), status)
}

/// `{"status":"success","data":...}`, or just the status when `data` is `None`.
pub fn deliver_success_json<T: Serialize>(data: Option<T>) -> Result<HttpResponse> {
    let body = match data {
        Some(d) => json!({ "status": "success", "data": d }),
        None => json!({ "status": "success" }),
    };

    deliver_serialized_json(&body, StatusCode::OK)
}

/// Last-resort 500. Built by hand so it cannot fail.
pub fn internal_error() -> HttpResponse {
    let body = Bytes::from_static(
        br#"{"status":"error","code":"INTERNAL_ERROR","message":"An internal error occurred"}"#,
    );
    let mut res = Response::new(full(body));
    *res.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    res.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );
    res
}
