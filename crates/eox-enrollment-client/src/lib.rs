// crates/eox-enrollment-client/src/lib.rs
// ============================================================================
// Module: EOX Enrollment Client Library
// Description: Typed client for the eox-core enrollment API and its OAuth gate.
// Purpose: Give system tests one place to load fixtures, authenticate, send
//          tenant-routed enrollment requests, and assert on responses.
// Dependencies: reqwest, serde, serde_json, thiserror, tracing, url
// ============================================================================

//! ## Overview
//! This crate wraps the two HTTP boundaries the enrollment system tests touch:
//! the OAuth client-credentials token endpoint and the
//! `eox-core/api/v1/enrollment/` endpoint. Requests are blocking and strictly
//! sequential; tenant selection happens through the `Host` header rather than
//! the connection target.
//!
//! Security posture: fixture files hold client secrets and the session token is
//! a live credential. Neither is written to transcripts, tracing events, or
//! `Debug` output.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod assertions;
pub mod auth;
pub mod enrollment;
pub mod error;
pub mod fixture;
pub mod transcript;

#[cfg(test)]
mod tests;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use assertions::AssertionError;
pub use assertions::SubsetMismatch;
pub use assertions::assert_empty;
pub use assertions::assert_status;
pub use assertions::assert_subset;
pub use auth::Authenticator;
pub use auth::HttpSettings;
pub use auth::SessionToken;
pub use enrollment::EnrollmentClient;
pub use enrollment::EnrollmentMethod;
pub use enrollment::EnrollmentRequest;
pub use enrollment::EnrollmentResponse;
pub use enrollment::MAX_RESPONSE_BYTES;
pub use enrollment::ResponseBody;
pub use error::ClientError;
pub use fixture::CourseFixture;
pub use fixture::FixtureConfig;
pub use fixture::SiteFixture;
pub use fixture::SiteKey;
pub use transcript::Transcript;
pub use transcript::TranscriptEntry;
