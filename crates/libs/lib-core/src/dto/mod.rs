//! # Data Transfer Objects
//!
//! Request and response bodies of the HTTP surface.

pub mod auth;
pub mod users;

pub use auth::{
    BearerResponse, ErrorResponse, ForgotPasswordRequest, LoginForm, MessageResponse,
    RequestVerifyTokenRequest, ResetPasswordRequest, VerifyRequest,
};
pub use users::{UserCreate, UserRead, UserUpdate, UserAdminUpdate};
