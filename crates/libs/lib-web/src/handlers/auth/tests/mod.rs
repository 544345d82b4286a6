//! # Auth Handler Tests
//!
//! Drive the real router over an in-memory database.
