use std::{borrow::Cow, fmt, sync::Weak};

use crate::{monitor::Shared, Message, Severity};

/// What a native callback should tell the layer under test after reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallbackAction {
    /// Let the offending call proceed.
    Continue,
    /// Ask the layer to skip the offending call.
    ///
    /// Only returned when bailout is enabled and the diagnostic matched a
    /// required expectation.
    Skip,
}

impl CallbackAction {
    pub fn is_skip(self) -> bool {
        self == Self::Skip
    }
}

/// Entry point for diagnostics emitted by the layer under test.
///
/// A `Sink` is cheap to clone and may be called from any thread. Every call
/// takes the monitor lock for the whole match, so diagnostics are processed
/// one at a time no matter how many threads the layer reports from.
///
/// Sinks do not keep their monitor alive: reporting after the monitor was
/// dropped is ignored, since drivers may still call back during teardown.
#[derive(Clone)]
pub struct Sink {
    pub(crate) shared: Weak<Shared>,
}

impl Sink {
    pub fn report(&self, message: Message) -> CallbackAction {
        match self.shared.upgrade() {
            Some(shared) => shared.report(message),
            None => {
                log::trace!("Diagnostic reported after monitor was dropped: {message}");
                CallbackAction::Continue
            }
        }
    }

    pub fn report_parts(
        &self,
        severity: Severity,
        text: impl Into<Cow<'static, str>>,
    ) -> CallbackAction {
        self.report(Message::new(severity, text))
    }

    /// Signal the monitor's [`FlushBarrier`](crate::FlushBarrier).
    ///
    /// Called by whoever waited on device work after its diagnostics were
    /// delivered. Returns the new generation, or `None` if the monitor is gone.
    pub fn signal_flush(&self) -> Option<u64> {
        self.shared.upgrade().map(|shared| shared.barrier.signal())
    }

    pub fn is_attached(&self) -> bool {
        self.shared.strong_count() != 0
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink")
            .field("attached", &self.is_attached())
            .finish()
    }
}
