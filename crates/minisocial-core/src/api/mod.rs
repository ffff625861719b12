//! REST API client module for the minisocial backend.
//!
//! This module provides the `ApiClient` for the `/auth/*` endpoints:
//! login, current-user lookup, registration with OTP verification, and
//! password recovery.
//!
//! Authenticated requests carry `Authorization: Bearer <token>`.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
