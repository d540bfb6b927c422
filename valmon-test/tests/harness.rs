use valmon_core::Message;
use valmon_test::{fail, fail_if, initialize_test, valid, TestParameters};

#[test]
fn fail_and_valid_helpers() {
    initialize_test(TestParameters::default(), |ctx| {
        let value = fail(ctx, "VUID-vkCmdCopyBuffer-srcOffset-00113", || {
            ctx.layer
                .emit(Message::error("VUID-vkCmdCopyBuffer-srcOffset-00113 out of range"));
            5
        });
        assert_eq!(value, 5);

        valid(ctx, || ctx.layer.emit(Message::info("copy recorded")));

        for should_fail in [false, true] {
            fail_if(ctx, should_fail, "VUID-vkCmdCopyBuffer-size-00115", || {
                if should_fail {
                    ctx.layer.emit(Message::error("VUID-vkCmdCopyBuffer-size-00115"));
                }
            });
        }
    });
}

#[test]
fn fail_waits_for_device_work() {
    initialize_test(TestParameters::default(), |ctx| {
        fail(ctx, "VUID-gpu-av", || {
            ctx.layer.record_gpu(Message::error("VUID-gpu-av descriptor OOB"));
            ctx.layer.submit()
        });
    });
}

#[test]
#[should_panic(expected = "UNEXPECTED TEST FAILURE DUE TO PANIC")]
fn valid_panics_on_diagnostic() {
    initialize_test(TestParameters::default(), |ctx| {
        valid(ctx, || ctx.layer.emit(Message::error("VUID-something")));
    });
}

#[test]
#[should_panic(expected = "UNEXPECTED TEST FAILURE DUE TO VALIDATION FAILURES")]
fn validation_failure_fails_the_test() {
    initialize_test(TestParameters::default(), |ctx| {
        ctx.monitor.set_desired_error("VUID-never");
        ctx.monitor.verify_found();
    });
}

#[test]
fn unexpected_pass() {
    let panic = std::panic::catch_unwind(|| {
        initialize_test(TestParameters::default().failure(), |_ctx| {});
    })
    .unwrap_err();
    assert_eq!(panic.downcast_ref::<&str>(), Some(&"UNEXPECTED TEST PASS"));
}

#[test]
fn unverified_scope_fails_the_test() {
    initialize_test(TestParameters::default().failure(), |ctx| {
        ctx.monitor.set_desired_error("VUID-declared-but-never-verified");
    });
}

#[test]
#[should_panic(expected = "UNEXPECTED TEST FAILURE DUE TO PANIC")]
fn empty_pattern_is_a_test_bug() {
    initialize_test(TestParameters::default(), |ctx| {
        ctx.monitor.set_desired_error("");
    });
}
