use std::{sync::Arc, thread};

use parking_lot::Mutex;

use crate::{
    error::{FailureKind, MonitorFailure, MonitorFailures, UnexpectedHint},
    expectation::{Disposition, ExpectationDescriptor, Timeline},
    registry::{ExpectationRegistry, MatchOutcome, PendingExpectation},
    sink::{CallbackAction, Sink},
    FlushBarrier, Message, MonitorConfig, SeverityFlags,
};

/// Verdict of a closed assertion scope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScopeVerdict {
    Satisfied,
    /// Required expectations that never reached their count.
    Unsatisfied(Vec<PendingExpectation>),
}

impl ScopeVerdict {
    pub fn is_satisfied(&self) -> bool {
        matches!(*self, Self::Satisfied)
    }
}

struct MonitorState {
    registry: ExpectationRegistry,
    /// Patterns tolerated any number of times until the monitor finishes.
    ignored: Vec<String>,
    failures: Vec<MonitorFailure>,
    scope: u64,
    bailout: bool,
}

impl MonitorState {
    fn record(&mut self, kind: FailureKind) {
        let failure = MonitorFailure {
            scope: self.scope,
            kind,
        };
        log::error!("{failure}");
        self.failures.push(failure);
    }

    fn close_scope(&mut self) {
        self.registry.reset();
        self.scope += 1;
    }
}

pub(crate) struct Shared {
    state: Mutex<MonitorState>,
    pub(crate) barrier: FlushBarrier,
    config: MonitorConfig,
}

impl Shared {
    pub(crate) fn report(&self, message: Message) -> CallbackAction {
        profiling::scope!("Sink::report");

        if self.config.log_messages {
            log::log!(message.severity().log_level(), "{}", message.text());
        }

        let mut state = self.state.lock();
        let hint = match state.registry.try_consume(&message) {
            MatchOutcome::Consumed(disposition) => {
                return if disposition.is_required() && state.bailout {
                    CallbackAction::Skip
                } else {
                    CallbackAction::Continue
                };
            }
            MatchOutcome::Exhausted { pattern, count } => {
                UnexpectedHint::AlreadySatisfied { pattern, count }
            }
            MatchOutcome::Unmatched => {
                let pending: Vec<String> = state
                    .registry
                    .pending_required()
                    .map(|e| e.pattern().to_string())
                    .collect();
                if pending.is_empty() {
                    UnexpectedHint::Nothing
                } else {
                    UnexpectedHint::Pending(pending)
                }
            }
        };

        if state.ignored.iter().any(|pattern| message.contains(pattern)) {
            log::trace!("Ignored diagnostic: {}", message.text());
            return CallbackAction::Continue;
        }
        if !self.config.strict.contains(message.severity().into()) {
            log::trace!("Dropping non-strict diagnostic: {message}");
            return CallbackAction::Continue;
        }

        state.record(FailureKind::UnexpectedDiagnostic { message, hint });
        CallbackAction::Continue
    }
}

/// Verifies the diagnostics of one test against what the test declared.
///
/// A monitor is created per test by the fixture that owns it, and handed to
/// the layer under test as a [`Sink`]. Declarations arm the current assertion
/// scope; [`verify_found`](Self::verify_found) closes it.
///
/// Failures never abort the test on their own. They are logged when they
/// happen and collected until [`finish`](Self::finish), so a single test can
/// surface every problem it runs into.
pub struct ErrorMonitor {
    shared: Arc<Shared>,
}

impl ErrorMonitor {
    pub fn new(config: MonitorConfig) -> Self {
        let bailout = config.bailout;
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(MonitorState {
                    registry: ExpectationRegistry::new(),
                    ignored: Vec::new(),
                    failures: Vec::new(),
                    scope: 0,
                    bailout,
                }),
                barrier: FlushBarrier::new(),
                config,
            }),
        }
    }

    pub fn sink(&self) -> Sink {
        Sink {
            shared: Arc::downgrade(&self.shared),
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.shared.config
    }

    pub fn flush_barrier(&self) -> &FlushBarrier {
        &self.shared.barrier
    }

    #[track_caller]
    fn expect(&self, desc: ExpectationDescriptor<'_>) {
        let armed_at = self.shared.barrier.generation();
        let result = self.shared.state.lock().registry.add(&desc, armed_at);
        if let Err(err) = result {
            panic!("{err}");
        }
    }

    /// Require one diagnostic containing `pattern` before the scope closes.
    #[track_caller]
    pub fn set_desired_error(&self, pattern: &str) {
        self.expect(ExpectationDescriptor::new(pattern));
    }

    /// Require `count` diagnostics containing `pattern`.
    #[track_caller]
    pub fn set_desired_error_count(&self, pattern: &str, count: u32) {
        self.expect(ExpectationDescriptor::new(pattern).with_count(count));
    }

    /// Require one diagnostic containing `pattern` with a severity in `flags`.
    #[track_caller]
    pub fn set_desired_failure_msg(&self, flags: SeverityFlags, pattern: &str) {
        self.expect(ExpectationDescriptor::new(pattern).with_severities(flags));
    }

    #[track_caller]
    pub fn set_desired_warning(&self, pattern: &str) {
        self.set_desired_failure_msg(SeverityFlags::WARNING, pattern);
    }

    /// Require a diagnostic that is produced by device work.
    ///
    /// The diagnostic only reaches the sink after the submission that produces
    /// it was waited on, and that wait was signalled on the
    /// [`FlushBarrier`]. If it is still missing at verification time and no
    /// such signal happened, the failure report says so.
    #[track_caller]
    pub fn set_desired_device_error(&self, pattern: &str) {
        self.expect(ExpectationDescriptor::new(pattern).with_timeline(Timeline::Device));
    }

    /// Tolerate one diagnostic containing `pattern` without requiring it.
    #[track_caller]
    pub fn set_unexpected_error(&self, pattern: &str) {
        self.expect(
            ExpectationDescriptor::new(pattern).with_disposition(Disposition::Unexpected),
        );
    }

    /// Tolerate one diagnostic containing `pattern` that may or may not be
    /// emitted, depending on the driver.
    #[track_caller]
    pub fn set_allowed_failure_msg(&self, pattern: &str) {
        self.expect(
            ExpectationDescriptor::new(pattern).with_disposition(Disposition::Allowed),
        );
    }

    /// Tolerate any number of diagnostics containing `pattern` for the rest of
    /// the test. Unlike the other declarations this survives
    /// [`verify_found`](Self::verify_found).
    #[track_caller]
    pub fn ignore_message(&self, pattern: &str) {
        assert!(!pattern.is_empty(), "ignored pattern must not be empty");
        self.shared.state.lock().ignored.push(pattern.to_string());
    }

    /// While enabled, a diagnostic that consumes a required expectation asks
    /// the layer to skip the offending call.
    ///
    /// The monitor cannot tell at report time which way the scope will be
    /// verified, so this also applies to patterns that
    /// [`verify_not_found`](Self::verify_not_found) later rejects: the call is
    /// skipped and the scope still fails.
    pub fn set_bailout(&self, bailout: bool) {
        self.shared.state.lock().bailout = bailout;
    }

    /// Close the current assertion scope and return its verdict.
    ///
    /// Every required expectation that did not reach its count is recorded as
    /// a failure. The registry is emptied either way.
    pub fn close_scope(&self) -> ScopeVerdict {
        profiling::scope!("ErrorMonitor::close_scope");

        let barrier = &self.shared.barrier;
        let mut state = self.shared.state.lock();
        let pending: Vec<PendingExpectation> = state
            .registry
            .pending_required()
            .map(|e| PendingExpectation {
                device_wait_missing: e.timeline() == Timeline::Device
                    && !barrier.flushed_since(e.armed_at()),
                ..PendingExpectation::from(e)
            })
            .collect();

        let verdict = if pending.is_empty() {
            log::debug!("Scope {} satisfied", state.scope);
            ScopeVerdict::Satisfied
        } else {
            state.record(FailureKind::MissingDiagnostic {
                pending: pending.clone(),
            });
            ScopeVerdict::Unsatisfied(pending)
        };
        state.close_scope();
        verdict
    }

    /// Assert that every diagnostic required in this scope was reported.
    ///
    /// The caller must have waited for any device work that produces the
    /// diagnostics before calling this.
    pub fn verify_found(&self) {
        let _ = self.close_scope();
    }

    /// Assert that none of the diagnostics declared as required in this scope
    /// were reported, then close the scope.
    ///
    /// Bailout still skips calls that reported such a diagnostic; see
    /// [`set_bailout`](Self::set_bailout).
    pub fn verify_not_found(&self) {
        profiling::scope!("ErrorMonitor::verify_not_found");

        let mut state = self.shared.state.lock();
        let seen: Vec<(String, u32)> = state
            .registry
            .iter()
            .filter(|e| e.disposition().is_required() && e.matched_count() != 0)
            .map(|e| (e.pattern().to_string(), e.matched_count()))
            .collect();
        for (pattern, seen) in seen {
            state.record(FailureKind::ForbiddenDiagnostic { pattern, seen });
        }
        state.close_scope();
    }

    /// Index of the current assertion scope.
    pub fn scope(&self) -> u64 {
        self.shared.state.lock().scope
    }

    /// Returns true if the current scope has any expectations registered.
    pub fn is_armed(&self) -> bool {
        !self.shared.state.lock().registry.is_empty()
    }

    /// Snapshot of the failures recorded so far.
    pub fn failures(&self) -> Vec<MonitorFailure> {
        self.shared.state.lock().failures.clone()
    }

    /// End the test: report a scope left armed, drop the ignore list and hand
    /// back every failure recorded so far.
    pub fn finish(&self) -> Result<(), MonitorFailures> {
        let mut state = self.shared.state.lock();

        if !state.registry.is_empty() {
            let pending: Vec<PendingExpectation> = state
                .registry
                .pending_required()
                .map(PendingExpectation::from)
                .collect();
            if pending.is_empty() {
                log::warn!(
                    "Scope {} was armed but never verified; its expectations were all met",
                    state.scope
                );
            } else {
                state.record(FailureKind::UnverifiedExpectations { pending });
            }
            state.close_scope();
        }
        state.ignored.clear();

        let failures = std::mem::take(&mut state.failures);
        if failures.is_empty() {
            Ok(())
        } else {
            Err(MonitorFailures(failures))
        }
    }
}

impl Default for ErrorMonitor {
    fn default() -> Self {
        Self::new(MonitorConfig::default())
    }
}

impl Drop for ErrorMonitor {
    fn drop(&mut self) {
        if thread::panicking() {
            return;
        }
        if let Err(failures) = self.finish() {
            panic!("ErrorMonitor dropped with unreported failures: {failures}");
        }
    }
}
