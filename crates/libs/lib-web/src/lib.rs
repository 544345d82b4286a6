//! # Web Library
//!
//! Authentication wiring, HTTP handlers, middleware and the server.

pub mod auth;
pub mod handlers;
pub mod middleware;
pub mod server;

pub use server::{create_router, start_server, AppState, ServerConfig};
