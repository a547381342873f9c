// crates/eox-enrollment-client/src/error.rs
// ============================================================================
// Module: Client Errors
// Description: Error type shared by fixture loading, auth, and dispatch.
// Purpose: Keep fatal setup failures distinct from per-request failures.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! [`ClientError`] covers every failure the client can report. Fixture and auth
//! failures end a run; request failures belong to a single exchange. Non-2xx
//! statuses are not errors here.

use std::path::PathBuf;

use thiserror::Error;

/// Enrollment client errors.
///
/// # Invariants
/// - `Fixture` and `Auth` are fatal for a test run; callers do not retry them.
/// - String payloads may include untrusted server text but never the client
///   secret or the session token.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Fixture file missing, unreadable, malformed, or invalid.
    #[error("fixture error ({}): {reason}", .path.display())]
    Fixture {
        /// Fixture path that failed to load.
        path: PathBuf,
        /// Failure description.
        reason: String,
    },
    /// Client configuration error (URL joins, header values, client build).
    #[error("client config error: {0}")]
    Config(String),
    /// Token exchange failed or returned an unusable payload.
    #[error("authentication failed: {0}")]
    Auth(String),
    /// Request rejected before it was sent.
    #[error("invalid enrollment request: {0}")]
    Request(String),
    /// Network or protocol failure while talking to the server.
    #[error("transport error: {0}")]
    Transport(String),
    /// JSON encoding or decoding failure.
    #[error("json error: {0}")]
    Json(String),
    /// Response body exceeded the read limit.
    #[error("response exceeds size limit ({actual} > {limit})")]
    ResponseTooLarge {
        /// Bytes read before giving up.
        actual: usize,
        /// Maximum accepted size in bytes.
        limit: usize,
    },
}
