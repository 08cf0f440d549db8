//! Auth gateway: the single point of entry for all backend calls.
//!
//! ARCHITECTURAL RULE: no other module may talk to the REST backend
//! directly. The wizard and session layers depend on the `AuthGateway`
//! trait so tests can substitute a scripted gateway.
//!
//! Retries are NEVER automatic here: OTP send/verify and submission are
//! retried only by explicit user action.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::models::payload::RegistrationPayload;

/// Which portal the gateway serves; selects the REST path prefix and the
/// role-scoped key the auth token persists under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    JobSeeker,
    Business,
}

impl Role {
    pub fn prefix(&self) -> &'static str {
        match self {
            Role::JobSeeker => "job-seeker",
            Role::Business => "business",
        }
    }

    pub fn auth_key(&self) -> &'static str {
        match self {
            Role::JobSeeker => "job-seeker-auth",
            Role::Business => "business-auth",
        }
    }

    fn signup_endpoint(&self) -> &'static str {
        match self {
            Role::JobSeeker => "initiate-signup",
            Role::Business => "signup",
        }
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Api { status: u16, message: String },
}

/// Bearer token issued on login or successful registration. Also the shape
/// persisted under the role-scoped key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthToken {
    pub token: String,
}

#[derive(Debug, Serialize)]
struct EmailBody<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct VerifyBody<'a> {
    email: &'a str,
    otp: &'a str,
}

#[derive(Debug, Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct ResetBody<'a> {
    email: &'a str,
    otp: &'a str,
    #[serde(rename = "newPassword")]
    new_password: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// The backend contract the onboarding flows depend on.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn send_email_otp(&self, email: &str) -> Result<(), GatewayError>;
    async fn verify_email_otp(&self, email: &str, otp: &str) -> Result<(), GatewayError>;
    async fn login(&self, email: &str, password: &str) -> Result<AuthToken, GatewayError>;
    async fn submit_registration(
        &self,
        payload: RegistrationPayload,
    ) -> Result<AuthToken, GatewayError>;
    async fn forgot_password(&self, email: &str) -> Result<(), GatewayError>;
    async fn reset_password(
        &self,
        email: &str,
        otp: &str,
        new_password: &str,
    ) -> Result<(), GatewayError>;
}

/// Reqwest-backed gateway, one instance per role.
#[derive(Clone)]
pub struct HttpAuthGateway {
    client: Client,
    base_url: String,
    role: Role,
}

impl HttpAuthGateway {
    pub fn new(base_url: impl Into<String>, role: Role, timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(timeout_secs))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.into(),
            role,
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.role.prefix(),
            endpoint
        )
    }

    /// Maps a non-success response to `GatewayError::Api`, surfacing the
    /// backend's `error.message` verbatim when the body parses.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiError>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        Err(GatewayError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn post_json<B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<reqwest::Response, GatewayError> {
        debug!("POST {}", self.url(endpoint));
        let response = self.client.post(self.url(endpoint)).json(body).send().await?;
        Self::check(response).await
    }
}

#[async_trait]
impl AuthGateway for HttpAuthGateway {
    async fn send_email_otp(&self, email: &str) -> Result<(), GatewayError> {
        self.post_json("send-email-otp", &EmailBody { email }).await?;
        info!("OTP sent to {email}");
        Ok(())
    }

    async fn verify_email_otp(&self, email: &str, otp: &str) -> Result<(), GatewayError> {
        self.post_json("verify-email", &VerifyBody { email, otp })
            .await?;
        info!("Email verified for {email}");
        Ok(())
    }

    async fn login(&self, email: &str, password: &str) -> Result<AuthToken, GatewayError> {
        let response = self
            .post_json("login", &LoginBody { email, password })
            .await?;
        Ok(response.json::<AuthToken>().await?)
    }

    async fn submit_registration(
        &self,
        payload: RegistrationPayload,
    ) -> Result<AuthToken, GatewayError> {
        let endpoint = self.role.signup_endpoint();
        debug!("POST {} (multipart)", self.url(endpoint));
        let form = payload.into_form()?;
        let response = self
            .client
            .post(self.url(endpoint))
            .multipart(form)
            .send()
            .await?;
        let response = Self::check(response).await?;
        info!("Registration accepted for {} portal", self.role.prefix());
        Ok(response.json::<AuthToken>().await?)
    }

    async fn forgot_password(&self, email: &str) -> Result<(), GatewayError> {
        self.post_json("forgot-password", &EmailBody { email })
            .await?;
        Ok(())
    }

    async fn reset_password(
        &self,
        email: &str,
        otp: &str,
        new_password: &str,
    ) -> Result<(), GatewayError> {
        self.post_json(
            "reset-password",
            &ResetBody {
                email,
                otp,
                new_password,
            },
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_prefixes() {
        assert_eq!(Role::JobSeeker.prefix(), "job-seeker");
        assert_eq!(Role::Business.prefix(), "business");
        assert_eq!(Role::JobSeeker.auth_key(), "job-seeker-auth");
        assert_eq!(Role::Business.auth_key(), "business-auth");
    }

    #[test]
    fn test_signup_endpoints_differ_by_role() {
        assert_eq!(Role::JobSeeker.signup_endpoint(), "initiate-signup");
        assert_eq!(Role::Business.signup_endpoint(), "signup");
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let gw = HttpAuthGateway::new("http://localhost:4000/", Role::JobSeeker, 30);
        assert_eq!(
            gw.url("send-email-otp"),
            "http://localhost:4000/job-seeker/send-email-otp"
        );
    }

    #[test]
    fn test_api_error_body_parses() {
        let body = r#"{"error":{"message":"OTP expired"}}"#;
        let parsed: ApiError = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.error.message, "OTP expired");
    }
}
