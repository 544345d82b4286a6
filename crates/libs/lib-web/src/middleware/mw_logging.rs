//! # Request/Response Logging Middleware
//!
//! Structured logging for HTTP requests and responses.
//!
//! This middleware logs:
//! - Request method, path, query params
//! - Request headers at debug level, with credentials redacted
//! - Response status, size, duration
//!
//! The session cookie and `Authorization` header carry live access tokens and
//! are never written to the log. Query strings of token-bearing endpoints are
//! dropped for the same reason.

use super::mw_req_stamp::RequestStamp;
use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Sensitive headers that should not be logged
const SENSITIVE_HEADERS: &[&str] = &[
    "authorization",
    "cookie",
    "set-cookie",
    "x-api-key",
    "x-auth-token",
];

/// Endpoints whose payloads carry passwords or tokens
const SENSITIVE_ENDPOINTS: &[&str] = &[
    "/auth/register",
    "/auth/cookie/login",
    "/auth/reset-password",
    "/auth/verify",
];

const REDACTED: &str = "***REDACTED***";

fn is_sensitive_header(name: &str) -> bool {
    let name_lower = name.to_lowercase();
    SENSITIVE_HEADERS.iter().any(|h| name_lower.contains(h))
}

fn is_sensitive_endpoint(path: &str) -> bool {
    SENSITIVE_ENDPOINTS.iter().any(|ep| path.starts_with(ep))
}

/// Request/response logging middleware
pub async fn log_requests(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = if is_sensitive_endpoint(&path) {
        req.uri().query().map(|_| REDACTED.to_string())
    } else {
        req.uri().query().map(|q| q.to_string())
    };

    let request_id = req
        .extensions()
        .get::<RequestStamp>()
        .map(|s| s.id.clone())
        .unwrap_or_else(|| "unknown".to_string());

    let headers: Vec<(String, String)> = req
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            if is_sensitive_header(name.as_str()) {
                Some((name.to_string(), REDACTED.to_string()))
            } else {
                value.to_str().ok().map(|v| (name.to_string(), v.to_string()))
            }
        })
        .collect();

    let user_agent = req
        .headers()
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        query = ?query,
        user_agent = ?user_agent,
        header_count = headers.len(),
        "[REQUEST] {} {}",
        method,
        path
    );

    debug!(
        request_id = %request_id,
        headers = ?headers,
        "[REQUEST HEADERS]"
    );

    let response = next.run(req).await;

    let duration = start.elapsed();
    let status = response.status();
    let status_code = status.as_u16();

    let content_length = response
        .headers()
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(0);

    if status.is_server_error() {
        error!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = status_code,
            duration_ms = duration.as_millis(),
            "[RESPONSE] {} {} -> {} ({}ms) [SERVER ERROR]",
            method,
            path,
            status_code,
            duration.as_millis()
        );
    } else if status.is_client_error() {
        warn!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = status_code,
            duration_ms = duration.as_millis(),
            "[RESPONSE] {} {} -> {} ({}ms) [CLIENT ERROR]",
            method,
            path,
            status_code,
            duration.as_millis()
        );
    } else {
        info!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = status_code,
            duration_ms = duration.as_millis(),
            size_bytes = content_length,
            "[RESPONSE] {} {} -> {} ({}ms, {} bytes)",
            method,
            path,
            status_code,
            duration.as_millis(),
            content_length
        );
    }

    response
}
