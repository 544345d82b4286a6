//! # Middleware
//!
//! Axum middleware for request stamping, request logging and response mapping.
//!
//! ## Modules
//!
//! - **[`mw_req_stamp`]**: Request ID and timestamp stamping
//! - **[`mw_logging`]**: Structured request/response logging with redaction
//! - **[`mw_res_map`]**: Server-error response logging

// region: --- Modules
pub mod mw_logging;
pub mod mw_req_stamp;
pub mod mw_res_map;
// endregion: --- Modules

// region: --- Re-exports
pub use mw_logging::log_requests;
pub use mw_req_stamp::{stamp_req, RequestStamp, REQUEST_ID_HEADER};
pub use mw_res_map::map_res;
// endregion: --- Re-exports
