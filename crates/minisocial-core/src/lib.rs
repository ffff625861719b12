//! Client core for the minisocial network.
//!
//! Owns the authentication session (token storage, current-user
//! hydration, login/logout) and the REST client it talks through.
//! Front ends construct one `SessionManager`, call `hydrate()` at
//! startup and observe it via `subscribe()`.

pub mod api;
pub mod auth;
pub mod config;
pub mod guard;
pub mod models;

pub use api::{ApiClient, ApiError};
pub use auth::{AuthError, HydrateOutcome, SessionManager, SessionState};
pub use config::Config;
pub use models::User;
