use valmon_core::{Message, ScopeVerdict};
use valmon_test::{initialize_test, TestParameters, TestingContext};

const OOB: &str = "VUID-vkCmdDispatch-storageBuffers-06936";

fn dispatch_out_of_bounds(ctx: &TestingContext) {
    ctx.layer.record_gpu(Message::error(format!(
        "Validation Error: [ {OOB} ] Descriptor index 0 access out of bounds."
    )));
}

#[test]
fn device_error_found_after_wait() {
    initialize_test(TestParameters::default(), |ctx| {
        ctx.monitor.set_desired_device_error(OOB);
        dispatch_out_of_bounds(ctx);
        ctx.layer.submit();
        ctx.layer.wait_idle();
        ctx.monitor.verify_found();
    });
}

#[test]
fn device_error_missing_before_wait() {
    let ctx = TestingContext::new(&TestParameters::default().quiet());
    ctx.monitor.set_desired_device_error(OOB);
    dispatch_out_of_bounds(&ctx);
    let submission = ctx.layer.submit();

    match ctx.monitor.close_scope() {
        ScopeVerdict::Unsatisfied(pending) => {
            assert_eq!(pending.len(), 1);
            assert!(pending[0].device_wait_missing);
        }
        ScopeVerdict::Satisfied => panic!("device diagnostic arrived before the wait"),
    }

    // Read back now, with nothing left to match it.
    ctx.layer.wait(submission);
    assert_eq!(ctx.layer.in_flight(), 0);
    assert_eq!(ctx.monitor.finish().unwrap_err().len(), 2);
}

#[test]
fn wait_on_index_flushes_earlier_submissions_only() {
    initialize_test(TestParameters::default(), |ctx| {
        ctx.monitor.set_desired_device_error("first");
        ctx.layer.record_gpu(Message::error("first"));
        let first = ctx.layer.submit();
        ctx.layer.record_gpu(Message::error("second"));
        ctx.layer.submit();

        ctx.layer.wait(first);
        assert_eq!(ctx.layer.in_flight(), 1);
        ctx.monitor.verify_found();

        ctx.monitor.set_desired_device_error("second");
        ctx.layer.wait_idle();
        ctx.monitor.verify_found();
    });
}

#[test]
fn unwaited_work_is_flushed_at_test_end() {
    initialize_test(TestParameters::default().failure(), |ctx| {
        ctx.layer.record_gpu(Message::error("late"));
        ctx.layer.submit();
    });
}

#[test]
fn flush_barrier_advances_on_wait() {
    let ctx = TestingContext::new(&TestParameters::default().quiet());
    let before = ctx.monitor.flush_barrier().generation();
    ctx.layer.wait_idle();
    assert!(ctx.monitor.flush_barrier().flushed_since(before));
    assert_eq!(ctx.monitor.finish(), Ok(()));
}
