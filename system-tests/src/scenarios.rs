// system-tests/src/scenarios.rs
// ============================================================================
// Module: Enrollment Scenario Table
// Description: The canonical list of enrollment API cases.
// Purpose: Describe every case as data so the live and offline suites run the
//          same table.
// Dependencies: eox-enrollment-client, serde_json
// ============================================================================

//! ## Overview
//! Each [`Scenario`] names one request against one tenant and the response the
//! deployment must return. Scenarios are independent except for their
//! [`Setup`] step, which re-establishes site1's enrollment state first.
//!
//! Identifiers come from the fixture so the table works against any deployment
//! that provides two sites with one user and one course each.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use eox_enrollment_client::EnrollmentMethod;
use eox_enrollment_client::EnrollmentRequest;
use eox_enrollment_client::FixtureConfig;
use eox_enrollment_client::SiteKey;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Course key that exists on no site.
pub const INVALID_COURSE_ID: &str = "fake_course_id";
/// Mode the fixture courses do not offer.
pub const INVALID_MODE: &str = "masters";
/// Mode used when creating against a nonexistent course.
pub const AUDIT_MODE: &str = "audit";

// ============================================================================
// SECTION: Types
// ============================================================================

/// State to establish on site1 before the scenario's own request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Setup {
    /// No setup request.
    None,
    /// Create site1's enrollment; any non-2xx fails setup.
    EnsureEnrolled,
    /// Delete site1's enrollment; 404 is accepted.
    EnsureAbsent,
}

impl Setup {
    /// Returns the stable step label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::EnsureEnrolled => "ensure_enrolled",
            Self::EnsureAbsent => "ensure_absent",
        }
    }
}

impl fmt::Display for Setup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Condition under which a scenario runs against a live deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioGate {
    /// Needs server-side mode validation, unreliable on development stacks.
    ModeValidation,
}

/// Expected response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "fields", rename_all = "snake_case")]
pub enum ExpectedBody {
    /// Body is not checked.
    Any,
    /// Body must be empty.
    Empty,
    /// Body must be an object containing these pairs.
    Subset(Map<String, Value>),
}

/// Expected response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expectation {
    /// Exact status code.
    pub status: u16,
    /// Body check.
    pub body: ExpectedBody,
}

/// One enrollment API case.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scenario {
    /// Stable scenario name.
    pub name: &'static str,
    /// One-line description.
    pub summary: &'static str,
    /// Setup step.
    pub setup: Setup,
    /// HTTP method.
    pub method: EnrollmentMethod,
    /// Site whose host goes in the `Host` header.
    pub site: SiteKey,
    /// Request fields.
    pub request: EnrollmentRequest,
    /// Expected response.
    pub expect: Expectation,
    /// Optional live-run gate.
    pub gate: Option<ScenarioGate>,
}

/// Expects a status and ignores the body.
const fn status(status: u16) -> Expectation {
    Expectation {
        status,
        body: ExpectedBody::Any,
    }
}

/// Expects a status and a body containing every listed field.
pub(crate) fn status_with_subset<I>(status: u16, fields: I) -> Expectation
where
    I: IntoIterator<Item = (&'static str, Value)>,
{
    let map: Map<String, Value> =
        fields.into_iter().map(|(key, value)| (key.to_string(), value)).collect();
    Expectation {
        status,
        body: ExpectedBody::Subset(map),
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Returns the setup request used by [`Setup::EnsureEnrolled`].
#[must_use]
pub fn enroll_request(fixture: &FixtureConfig) -> EnrollmentRequest {
    let site1 = &fixture.site1;
    EnrollmentRequest::by_email(&site1.user_email, &site1.course.id).with_mode(&site1.course.mode)
}

/// Returns the setup request used by [`Setup::EnsureAbsent`].
#[must_use]
pub fn unenroll_request(fixture: &FixtureConfig) -> EnrollmentRequest {
    let site1 = &fixture.site1;
    EnrollmentRequest::by_email(&site1.user_email, &site1.course.id)
}

/// Builds the canonical scenario table for a fixture.
#[must_use]
#[allow(clippy::too_many_lines, reason = "The table reads best as one literal list.")]
pub fn catalog(fixture: &FixtureConfig) -> Vec<Scenario> {
    let site1 = &fixture.site1;
    let site2 = &fixture.site2;
    let course = &site1.course;
    vec![
        Scenario {
            name: "read_valid_email_course",
            summary: "read an existing enrollment by email",
            setup: Setup::EnsureEnrolled,
            method: EnrollmentMethod::Get,
            site: SiteKey::Site1,
            request: EnrollmentRequest::by_email(&site1.user_email, &course.id),
            expect: status_with_subset(
                200,
                [("username", json!(site1.user_id)), ("course_id", json!(course.id))],
            ),
            gate: None,
        },
        Scenario {
            name: "read_invalid_enrollment",
            summary: "read an enrollment that does not exist",
            setup: Setup::None,
            method: EnrollmentMethod::Get,
            site: SiteKey::Site2,
            request: EnrollmentRequest::by_username(&site2.user_id, &course.id),
            expect: status(404),
            gate: None,
        },
        Scenario {
            name: "read_invalid_enrollment_for_site",
            summary: "read another site's enrollment",
            setup: Setup::None,
            method: EnrollmentMethod::Get,
            site: SiteKey::Site2,
            request: EnrollmentRequest::by_username(&site1.user_id, &course.id),
            expect: status(404),
            gate: None,
        },
        Scenario {
            name: "create_enrollment_valid_user_mode_course",
            summary: "create with a valid user, course, and mode",
            setup: Setup::EnsureAbsent,
            method: EnrollmentMethod::Post,
            site: SiteKey::Site1,
            request: EnrollmentRequest::by_email(&site1.user_email, &course.id)
                .with_mode(&course.mode),
            expect: status_with_subset(200, [("course_id", json!(course.id))]),
            gate: None,
        },
        Scenario {
            name: "force_create_enrollment_valid_user_mode_course",
            summary: "force-create with a valid user, course, and mode",
            setup: Setup::EnsureAbsent,
            method: EnrollmentMethod::Post,
            site: SiteKey::Site1,
            request: EnrollmentRequest::by_email(&site1.user_email, &course.id)
                .with_mode(&course.mode)
                .with_force(true),
            expect: status(200),
            gate: None,
        },
        Scenario {
            name: "create_valid_course_mode_invalid_user",
            summary: "create for a user that does not exist",
            setup: Setup::None,
            method: EnrollmentMethod::Post,
            site: SiteKey::Site1,
            request: EnrollmentRequest::by_username(&site1.fake_user, &course.id)
                .with_mode(&course.mode),
            expect: status(400),
            gate: None,
        },
        Scenario {
            name: "create_valid_course_mode_invalid_user_for_site",
            summary: "create on site1 for a user registered on site2",
            setup: Setup::None,
            method: EnrollmentMethod::Post,
            site: SiteKey::Site1,
            request: EnrollmentRequest::by_email(&site2.user_email, &course.id)
                .with_mode(&course.mode),
            expect: status(202),
            gate: None,
        },
        Scenario {
            name: "create_valid_user_mode_invalid_course",
            summary: "create for a course that does not exist",
            setup: Setup::None,
            method: EnrollmentMethod::Post,
            site: SiteKey::Site1,
            request: EnrollmentRequest::by_email(&site1.user_email, INVALID_COURSE_ID)
                .with_mode(AUDIT_MODE)
                .with_force(true),
            expect: status(400),
            gate: None,
        },
        Scenario {
            name: "create_valid_user_mode_invalid_course_for_site",
            summary: "create on site2 for a course that belongs to site1",
            setup: Setup::None,
            method: EnrollmentMethod::Post,
            site: SiteKey::Site2,
            request: EnrollmentRequest::by_email(&site2.user_email, &course.id)
                .with_mode(&course.mode)
                .with_force(true),
            expect: status(400),
            gate: None,
        },
        Scenario {
            name: "create_valid_user_course_invalid_mode",
            summary: "create with a mode the course does not offer",
            setup: Setup::None,
            method: EnrollmentMethod::Post,
            site: SiteKey::Site1,
            request: EnrollmentRequest::by_email(&site1.user_email, &course.id)
                .with_mode(INVALID_MODE)
                .with_force(true),
            expect: status(400),
            gate: Some(ScenarioGate::ModeValidation),
        },
        Scenario {
            name: "delete_valid_enrollment",
            summary: "delete an existing enrollment",
            setup: Setup::EnsureEnrolled,
            method: EnrollmentMethod::Delete,
            site: SiteKey::Site1,
            request: EnrollmentRequest::by_email(&site1.user_email, &course.id),
            expect: Expectation {
                status: 204,
                body: ExpectedBody::Empty,
            },
            gate: None,
        },
        Scenario {
            name: "delete_invalid_enrollment",
            summary: "delete an enrollment that does not exist",
            setup: Setup::None,
            method: EnrollmentMethod::Delete,
            site: SiteKey::Site2,
            request: EnrollmentRequest::by_email(&site2.user_email, &course.id),
            expect: status(404),
            gate: None,
        },
        Scenario {
            name: "delete_invalid_enrollment_for_site",
            summary: "delete another site's enrollment",
            setup: Setup::None,
            method: EnrollmentMethod::Delete,
            site: SiteKey::Site2,
            request: EnrollmentRequest::by_email(&site1.user_email, &course.id),
            expect: status(404),
            gate: None,
        },
        Scenario {
            name: "update_valid_enrollment_change_is_active",
            summary: "deactivate an existing enrollment",
            setup: Setup::EnsureEnrolled,
            method: EnrollmentMethod::Put,
            site: SiteKey::Site1,
            request: EnrollmentRequest::by_email(&site1.user_email, &course.id)
                .with_is_active(false)
                .with_mode(&course.mode),
            expect: status_with_subset(
                200,
                [
                    ("user", json!(site1.user_id)),
                    ("is_active", Value::Bool(false)),
                    ("course_id", json!(course.id)),
                ],
            ),
            gate: None,
        },
        Scenario {
            name: "update_valid_enrollment_change_invalid_mode",
            summary: "update an existing enrollment to an unavailable mode",
            setup: Setup::EnsureEnrolled,
            method: EnrollmentMethod::Put,
            site: SiteKey::Site1,
            request: EnrollmentRequest::by_email(&site1.user_email, &course.id)
                .with_is_active(true)
                .with_mode(INVALID_MODE),
            expect: status(400),
            gate: None,
        },
        Scenario {
            name: "update_invalid_enrollment_change_valid_mode",
            summary: "change the mode of an enrollment that does not exist",
            setup: Setup::None,
            method: EnrollmentMethod::Put,
            site: SiteKey::Site2,
            request: EnrollmentRequest::by_email(&site2.user_email, &course.id)
                .with_is_active(true)
                .with_mode(INVALID_MODE),
            expect: status(400),
            gate: None,
        },
        Scenario {
            name: "update_invalid_enrollment_change_is_active",
            summary: "deactivate an enrollment that does not exist",
            setup: Setup::None,
            method: EnrollmentMethod::Put,
            site: SiteKey::Site2,
            request: EnrollmentRequest::by_email(&site2.user_email, &course.id)
                .with_is_active(false)
                .with_mode(INVALID_MODE),
            expect: status(400),
            gate: None,
        },
    ]
}

/// Looks up one scenario by name.
#[must_use]
pub fn find(fixture: &FixtureConfig, name: &str) -> Option<Scenario> {
    catalog(fixture).into_iter().find(|scenario| scenario.name == name)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
