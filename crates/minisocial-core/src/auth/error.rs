use thiserror::Error;

use crate::api::ApiError;

/// Fallback shown when a login rejection carries no server message.
const DEFAULT_LOGIN_FAILURE: &str = "Login failed";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Login rejected. Holds the server's message verbatim when it sent one.
    #[error("{0}")]
    InvalidCredentials(String),

    #[error("Session expired or was rejected by the server")]
    SessionExpired,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Service error: {0}")]
    Service(String),

    #[error("Already logged in")]
    AlreadyAuthenticated,

    #[error("Logged out while the request was in flight")]
    Superseded,

    #[error("Failed to persist session: {0}")]
    Storage(String),
}

impl AuthError {
    /// Classify a failed `POST /auth/login`.
    pub fn from_login(err: ApiError) -> Self {
        if err.is_rejection() {
            let message = err.message().unwrap_or(DEFAULT_LOGIN_FAILURE);
            return AuthError::InvalidCredentials(message.to_string());
        }
        Self::from_transport(err)
    }

    /// Classify a failed `GET /auth/me`. Any answer short of success from
    /// the server means the stored token is no good.
    pub fn from_identity_fetch(err: ApiError) -> Self {
        if err.is_rejection() {
            return AuthError::SessionExpired;
        }
        Self::from_transport(err)
    }

    fn from_transport(err: ApiError) -> Self {
        match err {
            ApiError::NetworkError(e) => AuthError::Network(e.to_string()),
            other => AuthError::Service(other.to_string()),
        }
    }

    /// Text for an inline form message.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::InvalidCredentials(message) => message.clone(),
            AuthError::SessionExpired => "Session expired. Please log in again.".to_string(),
            AuthError::Network(_) => {
                "Unable to connect to server. Check your internet connection.".to_string()
            }
            AuthError::Service(_) => "Server is having trouble. Please try again.".to_string(),
            AuthError::AlreadyAuthenticated => "You are already logged in.".to_string(),
            AuthError::Superseded => "Login was cancelled.".to_string(),
            AuthError::Storage(_) => "Could not save your session on this device.".to_string(),
        }
    }
}
