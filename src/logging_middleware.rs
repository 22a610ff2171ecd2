// src/logging_middleware.rs
//! Logs failed requests together with their (redacted) body

use axum::body::to_bytes;
use axum::{
    body::Body,
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use tracing::{error, warn};

use crate::common::helpers::redact_json;

/// Request bodies above this size are rejected before reaching a handler.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Renders a request body for the logs with secrets masked. Non-JSON bodies
/// are summarized by size only.
pub fn describe_body(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return String::new();
    }
    match serde_json::from_slice::<serde_json::Value>(bytes) {
        Ok(mut json) => {
            redact_json(&mut json);
            json.to_string()
        }
        Err(_) => format!("<{} bytes>", bytes.len()),
    }
}

/// Buffers the request body so it can be logged when the response is a
/// client (warn) or server (error) error.
pub async fn log_failed_requests(request: Request, next: Next) -> Result<Response, StatusCode> {
    let (parts, body) = request.into_parts();

    let bytes = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|_| StatusCode::PAYLOAD_TOO_LARGE)?;

    let method = parts.method.clone();
    let path = parts.uri.path().to_string();
    let query = parts.uri.query().unwrap_or_default().to_string();

    let request = Request::from_parts(parts, Body::from(bytes.clone()));
    let response = next.run(request).await;
    let status = response.status();

    if status.is_server_error() {
        error!(
            method = %method,
            path = %path,
            query = %query,
            status = status.as_u16(),
            body = %describe_body(&bytes),
            "Request failed"
        );
    } else if status.is_client_error() {
        warn!(
            method = %method,
            path = %path,
            query = %query,
            status = status.as_u16(),
            body = %describe_body(&bytes),
            "Request rejected"
        );
    }

    Ok(response)
}
