// system-tests/tests/suites/enrollment_live.rs
// ============================================================================
// Module: Live Enrollment Tests
// Description: Runs the scenario table against a configured deployment.
// Purpose: Verify tenant isolation and enrollment semantics end to end.
// Dependencies: system-tests helpers
// ============================================================================

//! Live enrollment system tests.
//!
//! One test per scenario so failures are reported by name. The runner is built
//! once; a fixture or auth failure fails every case with the same message.

use std::error::Error;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::OnceLock;

use helpers::artifacts::TestReporter;
use system_tests::config::RunMode;
use system_tests::config::SystemTestConfig;
use system_tests::runner::ScenarioRunner;
use system_tests::scenarios::find;

use crate::helpers;

type TestResult = Result<(), Box<dyn Error>>;

enum Session {
    Live(ScenarioRunner),
    Skipped(String),
}

fn session() -> &'static Result<Session, String> {
    static SESSION: OnceLock<Result<Session, String>> = OnceLock::new();
    SESSION.get_or_init(|| {
        helpers::logging::init();
        let config = SystemTestConfig::load()?;
        match config.run_mode() {
            RunMode::Skipped {
                reason,
            } => Ok(Session::Skipped(reason)),
            RunMode::Live => ScenarioRunner::connect(&config)
                .map(Session::Live)
                .map_err(|err| err.to_string()),
        }
    })
}

fn serial() -> MutexGuard<'static, ()> {
    static LOCK: Mutex<()> = Mutex::new(());
    LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Returns the live runner, or `None` when the suite is skipped.
fn live_runner(test_name: &str) -> Result<Option<&'static ScenarioRunner>, Box<dyn Error>> {
    match session() {
        Ok(Session::Live(runner)) => Ok(Some(runner)),
        Ok(Session::Skipped(reason)) => {
            tracing::warn!(
                test = test_name,
                reason = reason.as_str(),
                "live enrollment suite skipped"
            );
            Ok(None)
        }
        Err(err) => Err(format!("enrollment session unavailable: {err}").into()),
    }
}

fn run_case(name: &str) -> TestResult {
    let _serial = serial();
    let Some(runner) = live_runner(name)? else {
        return Ok(());
    };
    let scenario = find(runner.fixture(), name).ok_or_else(|| format!("unknown scenario {name}"))?;
    let mut reporter = TestReporter::new(name)?.starting_at(runner.transcript().len());
    let report = match runner.run(&scenario) {
        Ok(report) => report,
        Err(err) => {
            reporter.fail(runner.transcript(), &err)?;
            return Err(err.into());
        }
    };
    reporter.finish(
        "pass",
        runner.transcript(),
        std::slice::from_ref(&report),
        vec![scenario.summary.to_string()],
    )?;
    drop(reporter);
    Ok(())
}

macro_rules! live_cases {
    ($($name:ident),+ $(,)?) => {
        $(
            #[test]
            fn $name() -> TestResult {
                run_case(stringify!($name))
            }
        )+
    };
}

live_cases!(
    read_valid_email_course,
    read_invalid_enrollment,
    read_invalid_enrollment_for_site,
    create_enrollment_valid_user_mode_course,
    force_create_enrollment_valid_user_mode_course,
    create_valid_course_mode_invalid_user,
    create_valid_course_mode_invalid_user_for_site,
    create_valid_user_mode_invalid_course,
    create_valid_user_mode_invalid_course_for_site,
    create_valid_user_course_invalid_mode,
    delete_valid_enrollment,
    delete_invalid_enrollment,
    delete_invalid_enrollment_for_site,
    update_valid_enrollment_change_is_active,
    update_valid_enrollment_change_invalid_mode,
    update_invalid_enrollment_change_valid_mode,
    update_invalid_enrollment_change_is_active,
);

#[test]
fn enrollment_lifecycle() -> TestResult {
    let _serial = serial();
    let Some(runner) = live_runner("enrollment_lifecycle")? else {
        return Ok(());
    };
    let mut reporter =
        TestReporter::new("enrollment_lifecycle")?.starting_at(runner.transcript().len());
    let reports = match runner.run_lifecycle() {
        Ok(reports) => reports,
        Err(err) => {
            reporter.fail(runner.transcript(), &err)?;
            return Err(err.into());
        }
    };
    reporter.finish(
        "pass",
        runner.transcript(),
        &reports,
        vec!["read, deactivate, delete, and re-read on site1".to_string()],
    )?;
    drop(reporter);
    Ok(())
}
