// crates/eox-enrollment-client/src/enrollment.rs
// ============================================================================
// Module: Enrollment Dispatcher
// Description: Tenant-routed requests against the eox-core enrollment endpoint.
// Purpose: Build enrollment fields, attach bearer and Host headers, and return
//          the raw status and decoded body for assertions.
// Dependencies: reqwest, serde_json, tracing
// ============================================================================

//! ## Overview
//! The dispatcher does not interpret status codes: a 404 is as much a result as
//! a 200, and the caller decides what was expected. Only failures to build,
//! send, or read a request are errors.
//!
//! Tenant routing is simulated at the infrastructure layer: every request goes
//! to the same base URL and the `Host` header names the site.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::io::Read;
use std::time::Instant;

use reqwest::Method;
use reqwest::blocking::Client;
use reqwest::blocking::Response;
use reqwest::header::AUTHORIZATION;
use reqwest::header::HOST;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::auth::Authenticator;
use crate::auth::HttpSettings;
use crate::auth::SessionToken;
use crate::error::ClientError;
use crate::fixture::FixtureConfig;
use crate::transcript::Transcript;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum response body size read from the server.
pub const MAX_RESPONSE_BYTES: usize = 1024 * 1024;
/// Maximum characters of a body quoted in error messages.
const BODY_PREVIEW_CHARS: usize = 512;

// ============================================================================
// SECTION: Request Types
// ============================================================================

/// HTTP methods accepted by the enrollment endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EnrollmentMethod {
    /// Read an enrollment.
    Get,
    /// Create an enrollment.
    Post,
    /// Update an enrollment.
    Put,
    /// Delete an enrollment.
    Delete,
}

impl EnrollmentMethod {
    /// Returns the HTTP method name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// Maps to the reqwest method.
    fn to_http(self) -> Method {
        match self {
            Self::Get => Method::GET,
            Self::Post => Method::POST,
            Self::Put => Method::PUT,
            Self::Delete => Method::DELETE,
        }
    }
}

impl fmt::Display for EnrollmentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields of one enrollment request.
///
/// # Invariants
/// - At most one user identifier is sent: `username` when set, else `email`.
/// - Optional fields are sent only when `Some`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct EnrollmentRequest {
    /// Username identifier; wins over `email` when both are set.
    pub username: Option<String>,
    /// Email identifier.
    pub email: Option<String>,
    /// Course key.
    pub course_id: String,
    /// Enrollment mode.
    pub mode: Option<String>,
    /// Active flag.
    pub is_active: Option<bool>,
    /// Bypass normal validation on create.
    pub force: Option<bool>,
}

impl EnrollmentRequest {
    /// Creates a request identifying the user by email.
    #[must_use]
    pub fn by_email(email: impl Into<String>, course_id: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            course_id: course_id.into(),
            ..Self::default()
        }
    }

    /// Creates a request identifying the user by username.
    #[must_use]
    pub fn by_username(username: impl Into<String>, course_id: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            course_id: course_id.into(),
            ..Self::default()
        }
    }

    /// Sets the enrollment mode.
    #[must_use]
    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    /// Sets the active flag.
    #[must_use]
    pub const fn with_is_active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    /// Sets the force flag.
    #[must_use]
    pub const fn with_force(mut self, force: bool) -> Self {
        self.force = Some(force);
        self
    }

    /// Returns the form fields in send order.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Request`] when no user identifier or course is set.
    pub fn form_fields(&self) -> Result<Vec<(&'static str, String)>, ClientError> {
        let mut fields = Vec::with_capacity(5);
        match (&self.username, &self.email) {
            (Some(username), _) => fields.push(("username", username.clone())),
            (None, Some(email)) => fields.push(("email", email.clone())),
            (None, None) => {
                return Err(ClientError::Request("username or email is required".into()));
            }
        }
        if self.course_id.trim().is_empty() {
            return Err(ClientError::Request("course_id is required".into()));
        }
        fields.push(("course_id", self.course_id.clone()));
        if let Some(mode) = &self.mode {
            fields.push(("mode", mode.clone()));
        }
        if let Some(is_active) = self.is_active {
            fields.push(("is_active", is_active.to_string()));
        }
        if let Some(force) = self.force {
            fields.push(("force", if force { "1" } else { "0" }.to_string()));
        }
        Ok(fields)
    }
}

// ============================================================================
// SECTION: Response Types
// ============================================================================

/// Decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// No body bytes.
    Empty,
    /// JSON body.
    Json(Value),
    /// Non-JSON body, decoded lossily.
    Text(String),
}

impl ResponseBody {
    /// Classifies raw response bytes as empty, JSON, or text.
    fn decode(bytes: &[u8]) -> Self {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Self::Empty;
        }
        serde_json::from_slice(bytes).map_or_else(
            |_| Self::Text(String::from_utf8_lossy(bytes).into_owned()),
            Self::Json,
        )
    }

    /// Returns the JSON value when the body was JSON.
    #[must_use]
    pub const fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Empty | Self::Text(_) => None,
        }
    }

    /// Returns true when the body was empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Returns the body as a JSON value for transcripts.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Empty => Value::Null,
            Self::Json(value) => value.clone(),
            Self::Text(text) => Value::String(text.clone()),
        }
    }

    /// Returns a short printable rendering for error messages.
    #[must_use]
    pub fn preview(&self) -> String {
        match self {
            Self::Empty => "<empty>".to_string(),
            Self::Json(value) => truncate(&value.to_string()),
            Self::Text(text) => truncate(text.trim()),
        }
    }
}

/// Status and body of one enrollment exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrollmentResponse {
    /// HTTP status code.
    pub status: u16,
    /// Decoded body.
    pub body: ResponseBody,
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Authenticated enrollment endpoint client.
///
/// # Invariants
/// - Every request carries the session token and exactly one `Host` header.
/// - Requests are sent one at a time; the client holds no retry state.
pub struct EnrollmentClient {
    /// Shared HTTP client.
    client: Client,
    /// Enrollment endpoint.
    url: Url,
    /// Bearer token for the run.
    token: SessionToken,
    /// Exchange log.
    transcript: Transcript,
}

impl EnrollmentClient {
    /// Creates a client from an existing token.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] when the enrollment URL cannot be derived.
    pub fn new(
        fixture: &FixtureConfig,
        client: Client,
        token: SessionToken,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            client,
            url: fixture.enrollment_url()?,
            token,
            transcript: Transcript::default(),
        })
    }

    /// Builds the HTTP client, authenticates once, and returns a ready client.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the client cannot be built or the token
    /// exchange fails.
    pub fn connect(fixture: &FixtureConfig, settings: &HttpSettings) -> Result<Self, ClientError> {
        let client = settings.build_client()?;
        let token = Authenticator::new(fixture, client.clone())?.authenticate()?;
        Self::new(fixture, client, token)
    }

    /// Returns the enrollment endpoint URL.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the exchange transcript.
    #[must_use]
    pub const fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Sends one enrollment request to the tenant selected by `host`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Request`] for invalid fields,
    /// [`ClientError::Config`] for invalid header values, and
    /// [`ClientError::Transport`] or [`ClientError::ResponseTooLarge`] when the
    /// exchange fails.
    pub fn send(
        &self,
        method: EnrollmentMethod,
        host: &str,
        request: &EnrollmentRequest,
    ) -> Result<EnrollmentResponse, ClientError> {
        let fields = request.form_fields()?;
        let headers = self.headers(host)?;
        let started = Instant::now();
        let response = self
            .client
            .request(method.to_http(), self.url.clone())
            .headers(headers)
            .form(&fields)
            .send()
            .map_err(|err| ClientError::Transport(format!("{method} {} failed: {err}", self.url)))?;
        let status = response.status().as_u16();
        let bytes = read_body_with_limit(response, MAX_RESPONSE_BYTES)?;
        let body = ResponseBody::decode(&bytes);
        tracing::debug!(
            method = method.as_str(),
            host,
            status,
            elapsed_ms = elapsed_millis(started),
            "enrollment request completed"
        );
        self.transcript.record(method, host, &fields, status, body.to_value());
        Ok(EnrollmentResponse {
            status,
            body,
        })
    }

    /// Sends a GET.
    ///
    /// # Errors
    ///
    /// See [`EnrollmentClient::send`].
    pub fn get(
        &self,
        host: &str,
        request: &EnrollmentRequest,
    ) -> Result<EnrollmentResponse, ClientError> {
        self.send(EnrollmentMethod::Get, host, request)
    }

    /// Sends a POST.
    ///
    /// # Errors
    ///
    /// See [`EnrollmentClient::send`].
    pub fn post(
        &self,
        host: &str,
        request: &EnrollmentRequest,
    ) -> Result<EnrollmentResponse, ClientError> {
        self.send(EnrollmentMethod::Post, host, request)
    }

    /// Sends a PUT.
    ///
    /// # Errors
    ///
    /// See [`EnrollmentClient::send`].
    pub fn put(
        &self,
        host: &str,
        request: &EnrollmentRequest,
    ) -> Result<EnrollmentResponse, ClientError> {
        self.send(EnrollmentMethod::Put, host, request)
    }

    /// Sends a DELETE.
    ///
    /// # Errors
    ///
    /// See [`EnrollmentClient::send`].
    pub fn delete(
        &self,
        host: &str,
        request: &EnrollmentRequest,
    ) -> Result<EnrollmentResponse, ClientError> {
        self.send(EnrollmentMethod::Delete, host, request)
    }

    /// Builds the Bearer and tenant `Host` headers.
    fn headers(&self, host: &str) -> Result<HeaderMap, ClientError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.token.as_str()))
            .map_err(|_| ClientError::Config("invalid bearer token header".to_string()))?;
        headers.insert(AUTHORIZATION, bearer);
        let host_value = HeaderValue::from_str(host)
            .map_err(|_| ClientError::Config(format!("invalid host header: {host}")))?;
        headers.insert(HOST, host_value);
        Ok(headers)
    }
}

// ============================================================================
// SECTION: Body Helpers
// ============================================================================

/// Reads a response body while enforcing a hard byte limit.
pub(crate) fn read_body_with_limit(response: Response, limit: usize) -> Result<Vec<u8>, ClientError> {
    let cap = u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1);
    let mut body = Vec::new();
    response
        .take(cap)
        .read_to_end(&mut body)
        .map_err(|err| ClientError::Transport(format!("failed to read response body: {err}")))?;
    if body.len() > limit {
        return Err(ClientError::ResponseTooLarge {
            actual: body.len(),
            limit,
        });
    }
    Ok(body)
}

/// Renders raw body bytes for error messages.
pub(crate) fn body_preview(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }
    truncate(trimmed)
}

/// Caps text at the preview length.
fn truncate(text: &str) -> String {
    match text.char_indices().nth(BODY_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Milliseconds since `started`, saturating at `u64::MAX`.
pub(crate) fn elapsed_millis(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
