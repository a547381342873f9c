// crates/eox-enrollment-client/src/auth.rs
// ============================================================================
// Module: OAuth Authenticator
// Description: Client-credentials token exchange against the deployment.
// Purpose: Obtain the single bearer token used for a whole test run.
// Dependencies: reqwest, serde
// ============================================================================

//! ## Overview
//! The suite authenticates exactly once. A non-2xx token response or a payload
//! without `access_token` is fatal; there is no refresh and no retry, since
//! the token is expected to outlive the run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::time::Duration;
use std::time::Instant;

use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use serde::Deserialize;
use url::Url;

use crate::enrollment::MAX_RESPONSE_BYTES;
use crate::enrollment::body_preview;
use crate::enrollment::elapsed_millis;
use crate::enrollment::read_body_with_limit;
use crate::error::ClientError;
use crate::fixture::FixtureConfig;

// ============================================================================
// SECTION: HTTP Settings
// ============================================================================

/// Settings for the shared blocking HTTP client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HttpSettings {
    /// Request timeout; `None` keeps the HTTP client's default.
    pub timeout: Option<Duration>,
}

impl HttpSettings {
    /// Builds the blocking client used for token and enrollment requests.
    ///
    /// Redirects are disabled so a redirect cannot drop the tenant `Host`
    /// header on its way to another origin.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] when the client cannot be constructed.
    pub fn build_client(&self) -> Result<Client, ClientError> {
        let mut builder = Client::builder().redirect(Policy::none());
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder
            .build()
            .map_err(|err| ClientError::Config(format!("failed to build http client: {err}")))
    }
}

// ============================================================================
// SECTION: Session Token
// ============================================================================

/// Bearer token obtained from the token endpoint.
///
/// # Invariants
/// - Never empty.
/// - `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wraps a raw token value.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Auth`] when the value is empty or whitespace.
    pub fn new(raw: impl Into<String>) -> Result<Self, ClientError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(ClientError::Auth("token endpoint returned an empty access_token".into()));
        }
        Ok(Self(raw))
    }

    /// Returns the raw token for the `Authorization` header.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

// ============================================================================
// SECTION: Authenticator
// ============================================================================

/// Token endpoint response body.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    /// Issued access token.
    access_token: Option<String>,
}

/// Performs the client-credentials exchange.
pub struct Authenticator {
    /// Shared HTTP client.
    client: Client,
    /// Token endpoint.
    token_url: Url,
    /// OAuth client identifier.
    client_id: String,
    /// OAuth client secret.
    client_secret: String,
    /// OAuth grant type.
    grant_type: String,
}

impl Authenticator {
    /// Creates an authenticator for the fixture's deployment.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] when the token URL cannot be derived.
    pub fn new(fixture: &FixtureConfig, client: Client) -> Result<Self, ClientError> {
        Ok(Self {
            client,
            token_url: fixture.token_url()?,
            client_id: fixture.client_id.clone(),
            client_secret: fixture.client_secret.clone(),
            grant_type: fixture.grant_type.clone(),
        })
    }

    /// Exchanges the client credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] when the request cannot be sent and
    /// [`ClientError::Auth`] on a non-2xx status or an unusable payload.
    pub fn authenticate(&self) -> Result<SessionToken, ClientError> {
        let form = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("grant_type", self.grant_type.as_str()),
        ];
        let started = Instant::now();
        let response = self
            .client
            .post(self.token_url.clone())
            .form(&form)
            .send()
            .map_err(|err| ClientError::Transport(format!("token request failed: {err}")))?;
        let status = response.status();
        let body = read_body_with_limit(response, MAX_RESPONSE_BYTES)?;
        tracing::debug!(
            url = %self.token_url,
            status = status.as_u16(),
            elapsed_ms = elapsed_millis(started),
            "token exchange completed"
        );
        if !status.is_success() {
            return Err(ClientError::Auth(format!(
                "token endpoint returned {}: {}",
                status.as_u16(),
                body_preview(&body)
            )));
        }
        let payload: TokenResponse = serde_json::from_slice(&body)
            .map_err(|err| ClientError::Auth(format!("invalid token response: {err}")))?;
        let token = payload
            .access_token
            .ok_or_else(|| ClientError::Auth("token response missing access_token".into()))?;
        SessionToken::new(token)
    }
}
