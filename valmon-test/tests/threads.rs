use valmon_core::Message;
use valmon_test::{initialize_test, TestParameters};

#[test]
fn worker_thread_reports_are_matched() {
    initialize_test(TestParameters::default(), |ctx| {
        ctx.monitor.set_desired_error_count("VUID-vkCreateGraphicsPipelines", 4);
        ctx.layer.emit_from_workers((0..4).map(|i| {
            Message::error(format!(
                "VUID-vkCreateGraphicsPipelines-pipelineCache-{i}: compiled on worker {i}"
            ))
        }));
        ctx.monitor.verify_found();
    });
}

#[test]
fn extra_worker_report_fails() {
    initialize_test(TestParameters::default().failure(), |ctx| {
        ctx.monitor.set_desired_error_count("VUID-worker", 3);
        ctx.layer
            .emit_from_workers((0..4).map(|i| Message::error(format!("VUID-worker {i}"))));
        ctx.monitor.verify_found();
    });
}

#[test]
fn host_and_device_reports_interleave() {
    initialize_test(TestParameters::default(), |ctx| {
        ctx.monitor.set_desired_error("VUID-host");
        ctx.monitor.set_desired_device_error("VUID-device");
        ctx.monitor.set_desired_error_count("VUID-worker", 2);

        ctx.layer.record_gpu(Message::error("VUID-device"));
        ctx.layer.submit();
        ctx.layer.emit(Message::error("VUID-host"));
        ctx.layer
            .emit_from_workers([Message::error("VUID-worker 0"), Message::error("VUID-worker 1")]);
        ctx.layer.wait_idle();
        ctx.monitor.verify_found();
    });
}
