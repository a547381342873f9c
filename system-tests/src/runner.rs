// system-tests/src/runner.rs
// ============================================================================
// Module: Scenario Runner
// Description: Executes enrollment scenarios against one authenticated client.
// Purpose: Run setup, dispatch, and assertions for each case and report the
//          outcome as a value.
// Dependencies: eox-enrollment-client, serde, serde_json, thiserror, tracing
// ============================================================================

//! ## Overview
//! A [`ScenarioRunner`] is built once per test binary: it loads the fixture,
//! authenticates, and then serves every case with the same session token.
//! Setup steps only touch site1's user and course, so any case can run after
//! any other.
//!
//! Failures are values: fixture and auth problems surface from
//! [`ScenarioRunner::connect`], while setup, transport, and contract failures
//! surface per case from [`ScenarioRunner::run`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use eox_enrollment_client::AssertionError;
use eox_enrollment_client::ClientError;
use eox_enrollment_client::EnrollmentClient;
use eox_enrollment_client::EnrollmentMethod;
use eox_enrollment_client::EnrollmentRequest;
use eox_enrollment_client::EnrollmentResponse;
use eox_enrollment_client::FixtureConfig;
use eox_enrollment_client::HttpSettings;
use eox_enrollment_client::SiteKey;
use eox_enrollment_client::Transcript;
use eox_enrollment_client::assert_empty;
use eox_enrollment_client::assert_status;
use eox_enrollment_client::assert_subset;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;

use crate::config::SystemTestConfig;
use crate::scenarios::Expectation;
use crate::scenarios::ExpectedBody;
use crate::scenarios::Scenario;
use crate::scenarios::ScenarioGate;
use crate::scenarios::Setup;
use crate::scenarios::enroll_request;
use crate::scenarios::status_with_subset;
use crate::scenarios::unenroll_request;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Scenario execution errors.
///
/// # Invariants
/// - `Setup` means the server state could not be prepared; the case itself
///   was not sent.
/// - `Assertion` fails only the named case.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// Transport, request, or configuration failure.
    #[error(transparent)]
    Client(#[from] ClientError),
    /// Setup request returned an unexpected status.
    #[error("setup step {step} failed with status {status}: {body_preview}")]
    Setup {
        /// Failing setup step.
        step: Setup,
        /// Status returned by the setup request.
        status: u16,
        /// Short rendering of the response body.
        body_preview: String,
    },
    /// Response violated the expected contract.
    #[error("scenario {scenario} failed: {source}")]
    Assertion {
        /// Scenario or lifecycle step name.
        scenario: String,
        /// Contract violation.
        #[source]
        source: AssertionError,
    },
}

// ============================================================================
// SECTION: Reports
// ============================================================================

/// How a case ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScenarioOutcome {
    /// Response matched the expectation.
    Passed,
    /// Case was not sent.
    Skipped {
        /// Why the case was not sent.
        reason: String,
    },
}

/// Result of one passed or skipped case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioReport {
    /// Scenario or lifecycle step name.
    pub name: String,
    /// Outcome.
    pub outcome: ScenarioOutcome,
    /// Status returned by the case request, when sent.
    pub status: Option<u16>,
}

impl ScenarioReport {
    /// Builds a passed report.
    fn passed(name: impl Into<String>, status: u16) -> Self {
        Self {
            name: name.into(),
            outcome: ScenarioOutcome::Passed,
            status: Some(status),
        }
    }

    /// Returns true when the case was sent and matched.
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self.outcome, ScenarioOutcome::Passed)
    }
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Runs scenarios with one fixture and one authenticated client.
pub struct ScenarioRunner {
    /// Loaded fixture.
    fixture: FixtureConfig,
    /// Authenticated client.
    client: EnrollmentClient,
    /// Whether gated mode-validation cases are sent.
    mode_validation: bool,
}

impl ScenarioRunner {
    /// Creates a runner from an already connected client.
    #[must_use]
    pub fn new(
        fixture: FixtureConfig,
        client: EnrollmentClient,
        config: &SystemTestConfig,
    ) -> Self {
        Self {
            fixture,
            client,
            mode_validation: config.mode_validation,
        }
    }

    /// Loads the configured fixture and authenticates once.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Fixture`] when the fixture cannot be loaded and
    /// [`ClientError::Auth`] or [`ClientError::Transport`] when the token
    /// exchange fails.
    pub fn connect(config: &SystemTestConfig) -> Result<Self, ClientError> {
        let fixture = FixtureConfig::load(&config.fixture_path)?;
        let settings = HttpSettings {
            timeout: config.timeout,
        };
        let client = EnrollmentClient::connect(&fixture, &settings)?;
        tracing::info!(
            base_url = %fixture.base_url,
            mode_validation = config.mode_validation,
            "enrollment scenario runner connected"
        );
        Ok(Self::new(fixture, client, config))
    }

    /// Returns the fixture.
    #[must_use]
    pub const fn fixture(&self) -> &FixtureConfig {
        &self.fixture
    }

    /// Returns the exchange transcript, setup requests included.
    #[must_use]
    pub const fn transcript(&self) -> &Transcript {
        self.client.transcript()
    }

    /// Returns true when the scenario's gate allows it to be sent.
    #[must_use]
    pub const fn is_enabled(&self, scenario: &Scenario) -> bool {
        match scenario.gate {
            None => true,
            Some(ScenarioGate::ModeValidation) => self.mode_validation,
        }
    }

    /// Runs setup, sends the case, and checks the response.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError`] when setup, dispatch, or an assertion fails.
    pub fn run(&self, scenario: &Scenario) -> Result<ScenarioReport, ScenarioError> {
        if !self.is_enabled(scenario) {
            tracing::info!(scenario = scenario.name, "scenario skipped by gate");
            return Ok(ScenarioReport {
                name: scenario.name.to_string(),
                outcome: ScenarioOutcome::Skipped {
                    reason: "mode validation scenarios are disabled".to_string(),
                },
                status: None,
            });
        }
        self.prepare(scenario.setup)?;
        let host = &self.fixture.site(scenario.site).host;
        let response = self.client.send(scenario.method, host, &scenario.request)?;
        check(scenario.name, &scenario.expect, &response)?;
        tracing::debug!(scenario = scenario.name, status = response.status, "scenario passed");
        Ok(ScenarioReport::passed(scenario.name, response.status))
    }

    /// Walks one enrollment through read, deactivate, delete, and re-read.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError`] for the first step that fails.
    pub fn run_lifecycle(&self) -> Result<Vec<ScenarioReport>, ScenarioError> {
        self.ensure_enrolled()?;
        let site = self.fixture.site(SiteKey::Site1);
        let by_email = EnrollmentRequest::by_email(&site.user_email, &site.course.id);
        let steps = [
            (
                "lifecycle_read_active",
                EnrollmentMethod::Get,
                by_email.clone(),
                status_with_subset(
                    200,
                    [("username", json!(site.user_id)), ("course_id", json!(site.course.id))],
                ),
            ),
            (
                "lifecycle_deactivate",
                EnrollmentMethod::Put,
                by_email.clone().with_is_active(false).with_mode(&site.course.mode),
                status_with_subset(
                    200,
                    [("is_active", Value::Bool(false)), ("course_id", json!(site.course.id))],
                ),
            ),
            (
                "lifecycle_delete",
                EnrollmentMethod::Delete,
                by_email.clone(),
                Expectation {
                    status: 204,
                    body: ExpectedBody::Empty,
                },
            ),
            (
                "lifecycle_read_deleted",
                EnrollmentMethod::Get,
                by_email,
                Expectation {
                    status: 404,
                    body: ExpectedBody::Any,
                },
            ),
        ];
        let mut reports = Vec::with_capacity(steps.len());
        for (name, method, request, expect) in steps {
            let response = self.client.send(method, &site.host, &request)?;
            check(name, &expect, &response)?;
            reports.push(ScenarioReport::passed(name, response.status));
        }
        Ok(reports)
    }

    /// Creates site1's enrollment.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Setup`] for any non-2xx status.
    pub fn ensure_enrolled(&self) -> Result<(), ScenarioError> {
        let host = &self.fixture.site1.host;
        let response = self.client.post(host, &enroll_request(&self.fixture))?;
        if is_success(response.status) {
            return Ok(());
        }
        Err(setup_failure(Setup::EnsureEnrolled, &response))
    }

    /// Deletes site1's enrollment when present.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Setup`] for any non-2xx status other than 404.
    pub fn ensure_absent(&self) -> Result<(), ScenarioError> {
        let host = &self.fixture.site1.host;
        let response = self.client.delete(host, &unenroll_request(&self.fixture))?;
        if is_success(response.status) || response.status == 404 {
            return Ok(());
        }
        Err(setup_failure(Setup::EnsureAbsent, &response))
    }

    /// Runs one setup step.
    fn prepare(&self, setup: Setup) -> Result<(), ScenarioError> {
        match setup {
            Setup::None => Ok(()),
            Setup::EnsureEnrolled => self.ensure_enrolled(),
            Setup::EnsureAbsent => self.ensure_absent(),
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Applies an expectation to a response.
fn check(
    name: &str,
    expect: &Expectation,
    response: &EnrollmentResponse,
) -> Result<(), ScenarioError> {
    let wrap = |source: AssertionError| ScenarioError::Assertion {
        scenario: name.to_string(),
        source,
    };
    assert_status(expect.status, response).map_err(wrap)?;
    match &expect.body {
        ExpectedBody::Any => Ok(()),
        ExpectedBody::Empty => assert_empty(response).map_err(wrap),
        ExpectedBody::Subset(fields) => {
            assert_subset(fields, &response.body.to_value()).map_err(wrap)
        }
    }
}

/// Returns true for 2xx codes.
const fn is_success(status: u16) -> bool {
    matches!(status, 200..=299)
}

/// Builds a setup error from the offending response.
fn setup_failure(step: Setup, response: &EnrollmentResponse) -> ScenarioError {
    tracing::warn!(step = step.as_str(), status = response.status, "setup step failed");
    ScenarioError::Setup {
        step,
        status: response.status,
        body_preview: response.body.preview(),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
