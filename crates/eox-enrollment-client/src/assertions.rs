// crates/eox-enrollment-client/src/assertions.rs
// ============================================================================
// Module: Response Assertions
// Description: Status, subset, and empty-body checks for enrollment responses.
// Purpose: Report contract violations as values instead of panics so a suite
//          can attach transcripts before failing the case.
// Dependencies: serde_json, thiserror
// ============================================================================

//! ## Overview
//! Body checks are superset comparisons: the actual JSON object must contain
//! every key of the expected map with an equal value, and any extra keys the
//! server returns are ignored.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::enrollment::EnrollmentResponse;

// ============================================================================
// SECTION: Types
// ============================================================================

/// One key that failed the subset comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubsetMismatch {
    /// Expected key absent from the actual object.
    Missing {
        /// Missing key.
        key: String,
        /// Expected value.
        expected: Value,
    },
    /// Key present with a different value.
    Different {
        /// Offending key.
        key: String,
        /// Expected value.
        expected: Value,
        /// Actual value.
        actual: Value,
    },
}

impl fmt::Display for SubsetMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing {
                key,
                expected,
            } => write!(f, "{key}: missing (expected {expected})"),
            Self::Different {
                key,
                expected,
                actual,
            } => write!(f, "{key}: expected {expected}, got {actual}"),
        }
    }
}

/// Contract violation found in a response.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssertionError {
    /// Status code differs from the expected one.
    #[error("expected status {expected}, got {actual} (body: {body_preview})")]
    Status {
        /// Expected status.
        expected: u16,
        /// Actual status.
        actual: u16,
        /// Short rendering of the response body.
        body_preview: String,
    },
    /// One or more expected keys are missing or differ.
    #[error("response body mismatch: {}", render_mismatches(.mismatches))]
    Body {
        /// Every offending key.
        mismatches: Vec<SubsetMismatch>,
    },
    /// A subset was expected but the body is not a JSON object.
    #[error("expected a json object body, got {0}")]
    NotAnObject(String),
    /// An empty body was expected.
    #[error("expected an empty body, got {0}")]
    NotEmpty(String),
}

/// Joins mismatches into one line.
fn render_mismatches(mismatches: &[SubsetMismatch]) -> String {
    mismatches.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

// ============================================================================
// SECTION: Assertions
// ============================================================================

/// Checks the response status for exact equality.
///
/// # Errors
///
/// Returns [`AssertionError::Status`] when the codes differ.
pub fn assert_status(expected: u16, response: &EnrollmentResponse) -> Result<(), AssertionError> {
    if response.status == expected {
        return Ok(());
    }
    Err(AssertionError::Status {
        expected,
        actual: response.status,
        body_preview: response.body.preview(),
    })
}

/// Checks that `actual` is an object containing every pair of `expected`.
///
/// # Errors
///
/// Returns [`AssertionError::NotAnObject`] when `actual` is not an object and
/// [`AssertionError::Body`] listing every missing or differing key otherwise.
pub fn assert_subset(expected: &Map<String, Value>, actual: &Value) -> Result<(), AssertionError> {
    let Some(actual) = actual.as_object() else {
        return Err(AssertionError::NotAnObject(actual.to_string()));
    };
    let mismatches: Vec<SubsetMismatch> = expected
        .iter()
        .filter_map(|(key, expected)| match actual.get(key) {
            None => Some(SubsetMismatch::Missing {
                key: key.clone(),
                expected: expected.clone(),
            }),
            Some(actual) if actual != expected => Some(SubsetMismatch::Different {
                key: key.clone(),
                expected: expected.clone(),
                actual: actual.clone(),
            }),
            Some(_) => None,
        })
        .collect();
    if mismatches.is_empty() {
        return Ok(());
    }
    Err(AssertionError::Body {
        mismatches,
    })
}

/// Checks that the response carried no body.
///
/// # Errors
///
/// Returns [`AssertionError::NotEmpty`] when body bytes were returned.
pub fn assert_empty(response: &EnrollmentResponse) -> Result<(), AssertionError> {
    if response.body.is_empty() {
        return Ok(());
    }
    Err(AssertionError::NotEmpty(response.body.preview()))
}
