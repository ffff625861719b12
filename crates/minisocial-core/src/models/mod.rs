//! Data models for minisocial entities.
//!
//! - `User`: the identity snapshot returned by `/auth/me` and `/auth/login`
//! - Wire payloads for the `/auth/*` endpoints

pub mod user;

pub use user::{
    ForgotPasswordRequest, LoginCredentials, LoginResponse, MessageResponse, RegisterRequest,
    ResetPasswordRequest, User, VerifyOtpRequest,
};
