// crates/eox-enrollment-client/src/transcript.rs
// ============================================================================
// Module: Exchange Transcript
// Description: In-memory log of enrollment requests and responses.
// Purpose: Let suites persist what was sent to which tenant and what came back.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! [`Transcript`] records each enrollment exchange in send order: method,
//! tenant host, form fields, status, and decoded body. The bearer token and
//! the client secret are never recorded.

use std::collections::BTreeMap;
use std::sync::Mutex;

use serde::Serialize;
use serde_json::Value;

use crate::enrollment::EnrollmentMethod;

/// One recorded exchange. Never contains the bearer token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptEntry {
    /// 1-based position in the transcript.
    pub sequence: u64,
    /// HTTP method.
    pub method: EnrollmentMethod,
    /// Tenant `Host` header.
    pub host: String,
    /// Form fields sent.
    pub fields: BTreeMap<String, String>,
    /// Response status.
    pub status: u16,
    /// Response body (`null` when empty).
    pub response: Value,
}

/// Append-only transcript shared by one client.
#[derive(Debug, Default)]
pub struct Transcript {
    /// Recorded entries.
    entries: Mutex<Vec<TranscriptEntry>>,
}

impl Transcript {
    /// Appends one exchange with the next sequence number.
    pub(crate) fn record(
        &self,
        method: EnrollmentMethod,
        host: &str,
        fields: &[(&'static str, String)],
        status: u16,
        response: Value,
    ) {
        let Ok(mut guard) = self.entries.lock() else {
            return;
        };
        let sequence = u64::try_from(guard.len()).unwrap_or(u64::MAX).saturating_add(1);
        guard.push(TranscriptEntry {
            sequence,
            method,
            host: host.to_string(),
            fields: fields.iter().map(|(key, value)| ((*key).to_string(), value.clone())).collect(),
            status,
            response,
        });
    }

    /// Returns a snapshot of the entries.
    #[must_use]
    pub fn entries(&self) -> Vec<TranscriptEntry> {
        self.entries.lock().map_or_else(|_| Vec::new(), |entries| entries.clone())
    }

    /// Returns the number of recorded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().map_or(0, |entries| entries.len())
    }

    /// Returns true when nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
