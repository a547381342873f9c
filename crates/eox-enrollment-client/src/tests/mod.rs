// crates/eox-enrollment-client/src/tests/mod.rs
// ============================================================================
// Module: Enrollment Client Unit Tests
// Description: Unit coverage for fixtures, auth, dispatch, and assertions.
// Purpose: Keep the harness contract checked without a live deployment.
// Dependencies: eox-enrollment-client, axum, tokio, tempfile
// ============================================================================

//! ## Overview
//! Unit tests for the enrollment client. HTTP-facing tests run against a
//! loopback axum server spawned per test.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only panic-based assertions are permitted."
)]

mod support;
