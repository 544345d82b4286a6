//! # Model Layer
//!
//! - [`store`]: SQLite pool, schema, scoped sessions, repositories and store adapters
//! - [`manager`]: user manager (registration, credentials, reset, verification) and lifecycle hooks

pub mod manager;
pub mod store;
