//! # Response Mapping Middleware
//!
//! Logs server-error responses with the request ID, after the error body has
//! already been rendered by [`lib_core::AppError`].

use super::mw_req_stamp::RequestStamp;
use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
};
use tracing::error;

pub async fn map_res(req: Request, next: Next) -> Response {
    let request_id = req
        .extensions()
        .get::<RequestStamp>()
        .map(|s| s.id.clone())
        .unwrap_or_else(|| "unknown".to_string());
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let res = next.run(req).await;

    if res.status().is_server_error() {
        error!(
            request_id = %request_id,
            "[RESPONSE] Server error: {} {} -> {}",
            method,
            path,
            res.status()
        );
    }

    res
}
