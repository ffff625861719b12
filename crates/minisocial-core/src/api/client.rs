//! API client for communicating with the minisocial REST API.
//!
//! `ApiClient` is also the production `IdentityService` the session
//! manager talks to.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::auth::IdentityService;
use crate::config::Config;
use crate::models::{
    ForgotPasswordRequest, LoginCredentials, LoginResponse, MessageResponse, RegisterRequest,
    ResetPasswordRequest, User, VerifyOtpRequest,
};

use super::ApiError;

// ============================================================================
// Endpoints
// ============================================================================

const LOGIN_PATH: &str = "/auth/login";
const ME_PATH: &str = "/auth/me";
const REGISTER_PATH: &str = "/auth/register";
const VERIFY_OTP_PATH: &str = "/auth/verify-otp";
const FORGOT_PASSWORD_PATH: &str = "/auth/forgot-password";
const RESET_PASSWORD_PATH: &str = "/auth/reset-password";

/// API client for the minisocial backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client against `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.api_base_url, config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `Authorization` value for `token`. Only `/auth/me` sends one.
    fn bearer(token: &str) -> Result<header::HeaderValue, ApiError> {
        let mut value = header::HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ApiError::InvalidResponse("token is not a valid header value".to_string()))?;
        value.set_sensitive(true);
        Ok(value)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response, url: &str) -> Result<T, ApiError> {
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse JSON response from {}: {}", url, e))
        })
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!(url = %url, "POST");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        Self::parse(response, &url).await
    }

    // ===== Session Endpoints =====

    /// Authenticate with email and password
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<LoginResponse, ApiError> {
        self.post(LOGIN_PATH, credentials).await
    }

    /// Fetch the account that owns `token`
    pub async fn me(&self, token: &str) -> Result<User, ApiError> {
        let url = self.url(ME_PATH);
        debug!(url = %url, "GET");

        let response = self
            .client
            .get(&url)
            .header(header::AUTHORIZATION, Self::bearer(token)?)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        Self::parse(response, &url).await
    }

    // ===== Registration and Recovery =====
    // None of these touch the local session.

    /// Create an account; the backend emails an OTP to confirm it
    pub async fn register(&self, request: &RegisterRequest) -> Result<MessageResponse, ApiError> {
        self.post(REGISTER_PATH, request).await
    }

    pub async fn verify_otp(&self, email: &str, otp: &str) -> Result<MessageResponse, ApiError> {
        let body = VerifyOtpRequest {
            email: email.to_string(),
            otp: otp.to_string(),
        };
        self.post(VERIFY_OTP_PATH, &body).await
    }

    pub async fn forgot_password(&self, email: &str) -> Result<MessageResponse, ApiError> {
        let body = ForgotPasswordRequest {
            email: email.to_string(),
        };
        self.post(FORGOT_PASSWORD_PATH, &body).await
    }

    pub async fn reset_password(
        &self,
        email: &str,
        otp: &str,
        new_password: &str,
    ) -> Result<MessageResponse, ApiError> {
        let body = ResetPasswordRequest {
            email: email.to_string(),
            otp: otp.to_string(),
            new_password: new_password.to_string(),
        };
        self.post(RESET_PASSWORD_PATH, &body).await
    }
}

#[async_trait]
impl IdentityService for ApiClient {
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginResponse, ApiError> {
        ApiClient::login(self, credentials).await
    }

    async fn fetch_current_user(&self, token: &str) -> Result<User, ApiError> {
        self.me(token).await
    }
}
