use valmon_core::{FailureKind, Message, UnexpectedHint};
use valmon_test::{initialize_test, TestParameters, TestingContext};

const DRAW_INDEXED: &str = "VUID-vkCmdDrawIndexed-None-07312";

fn draw_without_index_buffer(ctx: &TestingContext) {
    ctx.layer.emit(Message::error(format!(
        "Validation Error: [ {DRAW_INDEXED} ] vkCmdDrawIndexed(): Index buffer object has not been bound to this command buffer."
    )));
}

#[test]
fn desired_error_is_found() {
    initialize_test(TestParameters::default(), |ctx| {
        ctx.monitor.set_desired_error(DRAW_INDEXED);
        draw_without_index_buffer(ctx);
        ctx.monitor.verify_found();
    });
}

#[test]
fn missing_desired_error_fails_the_test() {
    initialize_test(TestParameters::default().failure(), |ctx| {
        ctx.monitor.set_desired_error(DRAW_INDEXED);
        ctx.monitor.verify_found();
    });
}

#[test]
fn surprise_error_fails_the_test() {
    initialize_test(TestParameters::default().failure(), |ctx| {
        ctx.layer
            .emit(Message::error("VUID-vkCmdDraw-None-02859 pipeline layout mismatch"));
        ctx.monitor.verify_found();
    });
}

#[test]
fn surprise_error_names_pending_patterns() {
    let ctx = TestingContext::new(&TestParameters::default().quiet());
    ctx.monitor.set_desired_error(DRAW_INDEXED);
    ctx.layer.emit(Message::error("VUID-vkCmdDraw-None-02859"));
    draw_without_index_buffer(&ctx);
    ctx.monitor.verify_found();

    let failures = ctx.monitor.finish().unwrap_err();
    assert_eq!(failures.len(), 1);
    assert_eq!(
        failures.0[0].kind,
        FailureKind::UnexpectedDiagnostic {
            message: Message::error("VUID-vkCmdDraw-None-02859"),
            hint: UnexpectedHint::Pending(vec![String::from(DRAW_INDEXED)]),
        }
    );
}

#[test]
fn tolerated_noise_passes() {
    initialize_test(TestParameters::default(), |ctx| {
        ctx.monitor.set_unexpected_error("Y");
        ctx.layer.emit(Message::warning("a warning about Y"));
        ctx.monitor.verify_found();
    });
}

#[test]
fn allowed_message_may_be_absent() {
    initialize_test(TestParameters::default(), |ctx| {
        ctx.monitor
            .set_allowed_failure_msg("VUID-VkImageCreateInfo-imageCreateMaxMipLevels-02251");
        ctx.monitor.set_desired_error(DRAW_INDEXED);
        draw_without_index_buffer(ctx);
        ctx.monitor.verify_found();
    });
}

#[test]
fn scopes_do_not_leak() {
    initialize_test(TestParameters::default().failure(), |ctx| {
        ctx.monitor.set_desired_error(DRAW_INDEXED);
        draw_without_index_buffer(ctx);
        ctx.monitor.verify_found();

        // Nothing declared for this scope.
        draw_without_index_buffer(ctx);
        ctx.monitor.verify_found();
    });
}

#[test]
fn ignored_message_is_tolerated_for_the_whole_test() {
    initialize_test(TestParameters::default(), |ctx| {
        ctx.monitor.ignore_message("UNASSIGNED-BestPractices");
        for scope in 0..3 {
            ctx.layer.emit(Message::warning(format!(
                "UNASSIGNED-BestPractices-vkCreateDevice scope {scope}"
            )));
            ctx.monitor.verify_found();
        }
    });
}

#[test]
fn verify_not_found_passes_when_quiet() {
    initialize_test(TestParameters::default(), |ctx| {
        ctx.monitor.set_desired_error(DRAW_INDEXED);
        ctx.monitor.verify_not_found();
    });
}

#[test]
fn verify_not_found_fails_when_reported() {
    initialize_test(TestParameters::default().failure(), |ctx| {
        ctx.monitor.set_desired_error(DRAW_INDEXED);
        draw_without_index_buffer(ctx);
        ctx.monitor.verify_not_found();
    });
}
