// system-tests/src/lib.rs
// ============================================================================
// Module: EOX Core Enrollment System Tests Library
// Description: Configuration, scenario table, and runner for enrollment tests.
// Purpose: Share one case table and one runner between the live and offline
//          system-test binaries.
// Dependencies: eox-enrollment-client, serde, thiserror, tracing
// ============================================================================

//! ## Overview
//! This crate hosts the enrollment scenario table, the runner that executes it,
//! and the environment-backed configuration used by the binaries in
//! `system-tests/tests`.
//! Security posture: fixture files carry OAuth client secrets; keep real
//! fixtures out of version control.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod runner;
pub mod scenarios;
