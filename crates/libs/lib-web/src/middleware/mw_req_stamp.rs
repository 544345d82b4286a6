//! # Request Stamping Middleware
//!
//! Gives every request an ID and a timestamp.
//!
//! A well-formed `X-Request-ID` sent by a proxy is kept so logs correlate
//! across hops; otherwise a UUID v4 is generated. The ID is echoed back in the
//! response headers.
//!
//! Request ID is available in handlers via `Extension<RequestStamp>`:
//!
//! ```rust,ignore
//! use axum::extract::Extension;
//! use lib_web::middleware::RequestStamp;
//!
//! async fn handler(Extension(stamp): Extension<RequestStamp>) -> String {
//!     format!("Request ID: {}", stamp.id)
//! }
//! ```

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::time::SystemTime;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest client-supplied request ID that is reused.
const MAX_REQUEST_ID_LEN: usize = 64;

/// Request metadata for tracing and debugging.
#[derive(Clone, Debug)]
pub struct RequestStamp {
    /// Unique request identifier
    pub id: String,
    /// Request timestamp
    pub timestamp: SystemTime,
}

impl RequestStamp {
    fn new(incoming: Option<&HeaderValue>) -> Self {
        let id = incoming
            .and_then(|value| value.to_str().ok())
            .filter(|id| is_acceptable_id(id))
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        Self {
            id,
            timestamp: SystemTime::now(),
        }
    }
}

fn is_acceptable_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_REQUEST_ID_LEN
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Request stamping middleware.
///
/// Adds a [`RequestStamp`] to the request extensions and `X-Request-ID` to the response.
pub async fn stamp_req(mut req: Request, next: Next) -> Response {
    let stamp = RequestStamp::new(req.headers().get(REQUEST_ID_HEADER));

    req.extensions_mut().insert(stamp.clone());

    let mut res = next.run(req).await;

    if let Ok(header_value) = HeaderValue::from_str(&stamp.id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, header_value);
    }

    res
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_id_is_uuid() {
        let stamp = RequestStamp::new(None);
        assert!(Uuid::parse_str(&stamp.id).is_ok());
    }

    #[test]
    fn test_incoming_id_reused_only_when_sane() {
        let good = HeaderValue::from_static("edge-1234_abc");
        assert_eq!(RequestStamp::new(Some(&good)).id, "edge-1234_abc");

        let bad = HeaderValue::from_static("not ok; drop table");
        assert_ne!(RequestStamp::new(Some(&bad)).id, "not ok; drop table");

        let long = HeaderValue::from_str(&"a".repeat(MAX_REQUEST_ID_LEN + 1)).unwrap();
        assert_eq!(RequestStamp::new(Some(&long)).id.len(), 36);
    }
}
