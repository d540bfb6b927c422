//! Test utilities for valmon.

mod layer;
mod params;
mod run;

pub use layer::{SimulatedLayer, SubmissionIndex};
pub use params::TestParameters;
pub use run::{initialize_test, TestingContext};

pub fn init_logger() {
    // We don't actually care if it fails
    let _ = env_logger::try_init();
}

/// Run some code in an assertion scope and assert that it produced a
/// diagnostic containing `pattern`.
///
/// Device work submitted by `callback` is waited on before the scope closes.
pub fn fail<T>(ctx: &TestingContext, pattern: &str, callback: impl FnOnce() -> T) -> T {
    ctx.monitor.set_desired_error(pattern);
    let result = callback();
    ctx.layer.wait_idle();
    assert!(
        ctx.monitor.close_scope().is_satisfied(),
        "expected a diagnostic matching {pattern:?}"
    );

    result
}

/// Run some code in an assertion scope and assert that it produced no
/// diagnostic the monitor treats as a failure.
pub fn valid<T>(ctx: &TestingContext, callback: impl FnOnce() -> T) -> T {
    let failures_before = ctx.monitor.failures().len();
    let result = callback();
    ctx.layer.wait_idle();
    ctx.monitor.verify_found();
    assert_eq!(
        ctx.monitor.failures().len(),
        failures_before,
        "unexpected diagnostics"
    );

    result
}

/// Run some code in an assertion scope and assert that it fails with `pattern`
/// or succeeds, depending on the provided `should_fail` boolean.
pub fn fail_if<T>(
    ctx: &TestingContext,
    should_fail: bool,
    pattern: &str,
    callback: impl FnOnce() -> T,
) -> T {
    if should_fail {
        fail(ctx, pattern, callback)
    } else {
        valid(ctx, callback)
    }
}
