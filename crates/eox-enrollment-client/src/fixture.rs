// crates/eox-enrollment-client/src/fixture.rs
// ============================================================================
// Module: Fixture Loader
// Description: Typed view of the enrollment test-data JSON document.
// Purpose: Load site definitions, OAuth credentials, and expected identifiers
//          once per run and derive the endpoint URLs from them.
// Dependencies: serde, serde_json, url
// ============================================================================

//! ## Overview
//! The fixture document describes two tenant sites sharing one deployment,
//! plus the OAuth client used to talk to it:
//!
//! ```json
//! {
//!   "base_url": "http://localhost:18000",
//!   "client_id": "...",
//!   "client_secret": "...",
//!   "site1_data": {
//!     "host": "site1.localhost",
//!     "user_email": "honor@example.com",
//!     "user_id": "honor",
//!     "fake_user": "nobody",
//!     "course": { "id": "course-v1:edX+DemoX+Demo_Course", "mode": "audit" }
//!   },
//!   "site2_data": { "...": "..." }
//! }
//! ```
//!
//! Loading fails closed: a missing file, malformed JSON, or an empty required
//! value is a [`ClientError::Fixture`] and aborts the run before any case.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use url::Url;

use crate::error::ClientError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// OAuth token endpoint path, relative to the fixture base URL.
pub const TOKEN_PATH: &str = "oauth2/access_token/";
/// Enrollment endpoint path, relative to the fixture base URL.
pub const ENROLLMENT_PATH: &str = "eox-core/api/v1/enrollment/";
/// Grant type used when the fixture does not name one.
pub const DEFAULT_GRANT_TYPE: &str = "client_credentials";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Selects one of the two tenant sites described by the fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteKey {
    /// The primary site; setup steps always target it.
    Site1,
    /// The secondary site used for cross-tenant checks.
    Site2,
}

impl SiteKey {
    /// Returns a stable label for the site.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Site1 => "site1",
            Self::Site2 => "site2",
        }
    }
}

impl fmt::Display for SiteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Course expected to exist on a site.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CourseFixture {
    /// Course key, e.g. `course-v1:Org+Course+Run`.
    pub id: String,
    /// Enrollment mode that is valid for the course.
    pub mode: String,
}

/// One tenant site and the identifiers expected to exist on it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SiteFixture {
    /// Value sent in the `Host` header to select this tenant.
    pub host: String,
    /// Email of a user registered on this site.
    pub user_email: String,
    /// Username of that user.
    pub user_id: String,
    /// Username that does not exist anywhere.
    pub fake_user: String,
    /// Course that belongs to this site.
    pub course: CourseFixture,
}

/// Loaded fixture document.
///
/// # Invariants
/// - Immutable after [`FixtureConfig::load`] returns.
/// - `Debug` output redacts `client_secret`.
#[derive(Clone, Deserialize)]
pub struct FixtureConfig {
    /// Deployment base URL, e.g. `http://localhost:18000`.
    pub base_url: String,
    /// OAuth client identifier.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// OAuth grant type.
    #[serde(default = "default_grant_type")]
    pub grant_type: String,
    /// Primary site.
    #[serde(rename = "site1_data")]
    pub site1: SiteFixture,
    /// Secondary site.
    #[serde(rename = "site2_data")]
    pub site2: SiteFixture,
}

impl fmt::Debug for FixtureConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixtureConfig")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("grant_type", &self.grant_type)
            .field("site1", &self.site1)
            .field("site2", &self.site2)
            .finish()
    }
}

/// Serde default for `grant_type`.
fn default_grant_type() -> String {
    DEFAULT_GRANT_TYPE.to_string()
}

// ============================================================================
// SECTION: Loading
// ============================================================================

impl FixtureConfig {
    /// Reads and validates the fixture document at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Fixture`] when the file cannot be read, is not
    /// valid JSON for the fixture schema, or fails validation.
    pub fn load(path: &Path) -> Result<Self, ClientError> {
        let raw = fs::read_to_string(path).map_err(|err| ClientError::Fixture {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|err| ClientError::Fixture {
            path: path.to_path_buf(),
            reason: format!("invalid fixture json: {err}"),
        })?;
        config.validate().map_err(|reason| ClientError::Fixture {
            path: path.to_path_buf(),
            reason,
        })?;
        Ok(config)
    }

    /// Checks required values and the base URL shape.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid value.
    pub fn validate(&self) -> Result<(), String> {
        require_nonempty("base_url", &self.base_url)?;
        require_nonempty("client_id", &self.client_id)?;
        require_nonempty("client_secret", &self.client_secret)?;
        require_nonempty("grant_type", &self.grant_type)?;
        for key in [SiteKey::Site1, SiteKey::Site2] {
            let site = self.site(key);
            require_nonempty(&format!("{key}_data.host"), &site.host)?;
            require_nonempty(&format!("{key}_data.course.id"), &site.course.id)?;
        }
        let base = Url::parse(&self.base_url)
            .map_err(|err| format!("base_url is not a valid url: {err}"))?;
        if !matches!(base.scheme(), "http" | "https") || base.host_str().is_none() {
            return Err("base_url must be an absolute http(s) url".to_string());
        }
        Ok(())
    }

    /// Returns the fixture for the requested site.
    #[must_use]
    pub const fn site(&self, key: SiteKey) -> &SiteFixture {
        match key {
            SiteKey::Site1 => &self.site1,
            SiteKey::Site2 => &self.site2,
        }
    }

    /// Returns the OAuth token endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] when the base URL cannot be joined.
    pub fn token_url(&self) -> Result<Url, ClientError> {
        self.endpoint(TOKEN_PATH)
    }

    /// Returns the enrollment endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] when the base URL cannot be joined.
    pub fn enrollment_url(&self) -> Result<Url, ClientError> {
        self.endpoint(ENROLLMENT_PATH)
    }

    /// Joins `path` onto the base URL.
    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        let mut base = Url::parse(&self.base_url)
            .map_err(|err| ClientError::Config(format!("invalid base_url: {err}")))?;
        // Url::join replaces the last segment unless the base ends with a slash.
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        base.join(path).map_err(|err| ClientError::Config(format!("invalid endpoint {path}: {err}")))
    }
}

/// Rejects blank required values.
fn require_nonempty(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} must not be empty"));
    }
    Ok(())
}
