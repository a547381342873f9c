// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared helpers for enrollment system-tests.
// Purpose: Provide the offline stub, artifact writers, and log setup.
// Dependencies: system-tests, eox-enrollment-client, axum, tracing-subscriber
// ============================================================================

//! ## Overview
//! Shared helpers for enrollment system-tests.
//! Invariants:
//! - Every test writes its transcript and summary under its own run root.
//! - Offline tests talk only to a loopback stub they own.
//!
//! Security posture: artifacts never include the client secret or the bearer
//! token.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

pub mod logging;
