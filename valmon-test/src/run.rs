use std::panic::{catch_unwind, AssertUnwindSafe};

use valmon_core::ErrorMonitor;

use crate::{init_logger, SimulatedLayer, TestParameters};

pub struct TestingContext {
    pub monitor: ErrorMonitor,
    pub layer: SimulatedLayer,
}

impl TestingContext {
    pub fn new(params: &TestParameters) -> Self {
        let monitor = ErrorMonitor::new(params.config.clone());
        let layer = SimulatedLayer::new(monitor.sink());
        Self { monitor, layer }
    }
}

pub fn initialize_test(params: TestParameters, test_function: impl FnOnce(&TestingContext)) {
    init_logger();

    let context = TestingContext::new(&params);

    // Run the test, and catch panics (possibly due to failed assertions).
    let panicked = catch_unwind(AssertUnwindSafe(|| test_function(&context))).is_err();

    // Device work the test never waited on still belongs to it.
    context.layer.wait_idle();

    // Check whether any validation failures were recorded during the test run.
    let validation_failed = match context.monitor.finish() {
        Ok(()) => false,
        Err(failures) => {
            log::error!("{failures}");
            true
        }
    };

    // Summarize reasons for actual failure, if any.
    let failure_cause = match (panicked, validation_failed) {
        (true, true) => Some("PANIC AND VALIDATION FAILURES"),
        (true, false) => Some("PANIC"),
        (false, true) => Some("VALIDATION FAILURES"),
        (false, false) => None,
    };

    // Compare actual results against expectations.
    match (failure_cause, params.always_failure) {
        // The test passed, as expected.
        (None, false) => log::info!("TEST RESULT: PASSED"),
        // The test failed unexpectedly.
        (Some(cause), false) => {
            panic!("UNEXPECTED TEST FAILURE DUE TO {cause}")
        }
        // The test passed unexpectedly.
        (None, true) => {
            panic!("UNEXPECTED TEST PASS");
        }
        // The test failed, as expected.
        (Some(cause), true) => {
            log::info!("TEST RESULT: EXPECTED FAILURE DUE TO {cause}");
        }
    }
}
