// system-tests/src/config/env.rs
// ============================================================================
// Module: System Test Environment
// Description: Environment-backed configuration for system tests.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid UTF-8 fails closed. The run mode is derived once
//! from the loaded values; suites never consult the environment directly.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Fixture file used when no override is set.
pub const DEFAULT_FIXTURE_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/test_data.json");

/// Environment keys for system test configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemTestEnv {
    /// Shared or continuous-integration context; any non-empty value skips live runs.
    Ci,
    /// Optional fixture path override.
    Fixture,
    /// Optional run root override.
    RunRoot,
    /// Optional timeout override in seconds (positive integer).
    TimeoutSeconds,
    /// Run mode-validation scenarios live (`true`/`false` or `1`/`0`).
    ModeValidation,
}

impl SystemTestEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ci => "CI",
            Self::Fixture => "EOX_CORE_SYSTEM_TEST_FIXTURE",
            Self::RunRoot => "EOX_CORE_SYSTEM_TEST_RUN_ROOT",
            Self::TimeoutSeconds => "EOX_CORE_SYSTEM_TEST_TIMEOUT_SEC",
            Self::ModeValidation => "EOX_CORE_SYSTEM_TEST_MODE_VALIDATION",
        }
    }
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Whether the live suite talks to the deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// Run every case against the deployment.
    Live,
    /// Skip the live suite entirely.
    Skipped {
        /// Why the suite is skipped.
        reason: String,
    },
}

/// Typed system test configuration derived from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemTestConfig {
    /// Set when running in a shared/CI context.
    pub ci: bool,
    /// Fixture document path.
    pub fixture_path: PathBuf,
    /// Optional run root override.
    pub run_root: Option<PathBuf>,
    /// Optional timeout override in seconds (positive integer).
    pub timeout: Option<Duration>,
    /// Run scenarios gated on server-side mode validation.
    pub mode_validation: bool,
}

impl Default for SystemTestConfig {
    fn default() -> Self {
        Self {
            ci: false,
            fixture_path: PathBuf::from(DEFAULT_FIXTURE_PATH),
            run_root: None,
            timeout: None,
            mode_validation: false,
        }
    }
}

impl SystemTestConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error when an environment value is not valid UTF-8, is empty,
    /// or fails validation (for example, an invalid timeout or boolean value).
    pub fn load() -> Result<Self, String> {
        // An empty CI value counts as unset.
        let ci = read_env_strict(SystemTestEnv::Ci.as_str())?
            .is_some_and(|value| !value.trim().is_empty());
        let fixture_path = read_env_nonempty(SystemTestEnv::Fixture.as_str())?
            .map_or_else(|| PathBuf::from(DEFAULT_FIXTURE_PATH), PathBuf::from);
        let run_root = read_env_nonempty(SystemTestEnv::RunRoot.as_str())?.map(PathBuf::from);
        let timeout = read_env_nonempty(SystemTestEnv::TimeoutSeconds.as_str())?
            .map(|value| parse_timeout_seconds(SystemTestEnv::TimeoutSeconds.as_str(), &value))
            .transpose()?;
        let mode_validation = parse_bool_env(
            SystemTestEnv::ModeValidation.as_str(),
            read_env_nonempty(SystemTestEnv::ModeValidation.as_str())?,
        )?;
        Ok(Self {
            ci,
            fixture_path,
            run_root,
            timeout,
            mode_validation,
        })
    }

    /// Returns the run mode for the live suite.
    #[must_use]
    pub fn run_mode(&self) -> RunMode {
        if self.ci {
            return RunMode::Skipped {
                reason: format!(
                    "{} is set; the live suite needs a dedicated deployment",
                    SystemTestEnv::Ci.as_str()
                ),
            };
        }
        RunMode::Live
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, String> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| format!("{name} must be valid UTF-8"))
    })
}

/// Reads an environment variable and rejects empty values.
///
/// # Errors
///
/// Returns an error when the variable is set but empty or whitespace.
fn read_env_nonempty(name: &str) -> Result<Option<String>, String> {
    match read_env_strict(name)? {
        Some(value) if value.trim().is_empty() => Err(format!("{name} must not be empty")),
        Some(value) => Ok(Some(value)),
        None => Ok(None),
    }
}

/// Parses a positive timeout value from an environment variable string.
///
/// # Errors
///
/// Returns an error when the value is missing, non-numeric, or zero.
fn parse_timeout_seconds(name: &str, raw: &str) -> Result<Duration, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(format!("{name} must be a positive integer number of seconds"));
    }
    let secs: u64 = trimmed
        .parse()
        .map_err(|_| format!("{name} must be a positive integer number of seconds"))?;
    if secs == 0 {
        return Err(format!("{name} must be greater than zero"));
    }
    Ok(Duration::from_secs(secs))
}

/// Parses a boolean environment variable with permissive defaults.
///
/// # Errors
///
/// Returns an error when the value is not a recognized boolean literal.
fn parse_bool_env(name: &str, raw: Option<String>) -> Result<bool, String> {
    let Some(value) = raw else {
        return Ok(false);
    };
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("true") || trimmed == "1" {
        return Ok(true);
    }
    if trimmed.eq_ignore_ascii_case("false") || trimmed == "0" {
        return Ok(false);
    }
    Err(format!("{name} must be 1, 0, true, or false"))
}
