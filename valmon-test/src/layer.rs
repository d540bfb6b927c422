use std::{
    error::Error,
    fmt, mem,
    sync::atomic::{AtomicU64, Ordering},
    thread::{self, JoinHandle},
};

use parking_lot::Mutex;
use valmon_core::{CallbackAction, Message, Sink};

/// Identifies a batch of device work handed to [`SimulatedLayer::submit`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubmissionIndex(u64);

struct Submission {
    index: SubmissionIndex,
    release: flume::Sender<()>,
    thread: JoinHandle<()>,
}

/// Stand-in for the validation layer under test.
///
/// Host-side diagnostics are reported while the triggering call runs, on the
/// calling thread or on driver worker threads. Diagnostics recorded into
/// device work are delivered by the submission's own thread, and only once
/// the submission is waited on: instrumented shaders write them to memory the
/// layer reads back during the wait.
pub struct SimulatedLayer {
    sink: Sink,
    recording: Mutex<Vec<Message>>,
    in_flight: Mutex<Vec<Submission>>,
    next_submission: AtomicU64,
}

impl SimulatedLayer {
    pub fn new(sink: Sink) -> Self {
        Self {
            sink,
            recording: Mutex::new(Vec::new()),
            in_flight: Mutex::new(Vec::new()),
            next_submission: AtomicU64::new(0),
        }
    }

    pub fn sink(&self) -> &Sink {
        &self.sink
    }

    /// Report a diagnostic inline, as if from inside an API call.
    pub fn emit(&self, message: Message) -> CallbackAction {
        self.sink.report(message)
    }

    /// Report a Rust error value, with its source chain, as an error diagnostic.
    pub fn emit_error(&self, err: &(dyn Error + 'static)) -> CallbackAction {
        valmon_hal::report_error(&self.sink, err)
    }

    /// Report each message from its own driver worker thread.
    ///
    /// All workers have finished reporting when this returns.
    pub fn emit_from_workers(&self, messages: impl IntoIterator<Item = Message>) {
        let sink = &self.sink;
        thread::scope(|s| {
            for message in messages {
                s.spawn(move || {
                    sink.report(message);
                });
            }
        });
    }

    /// Record a diagnostic that the next submission will produce on the device.
    pub fn record_gpu(&self, message: Message) {
        self.recording.lock().push(message);
    }

    /// Submit everything recorded with [`record_gpu`](Self::record_gpu).
    pub fn submit(&self) -> SubmissionIndex {
        let commands = mem::take(&mut *self.recording.lock());

        // Indices are handed out under the lock so `in_flight` stays sorted.
        let mut in_flight = self.in_flight.lock();
        let index = SubmissionIndex(self.next_submission.fetch_add(1, Ordering::Relaxed));
        log::trace!("Submitting {index:?} with {} device diagnostics", commands.len());

        let (release, readback) = flume::bounded(1);
        let sink = self.sink.clone();
        let thread = thread::spawn(move || {
            // Never waited on; nothing is read back.
            if readback.recv().is_err() {
                return;
            }
            for message in commands {
                sink.report(message);
            }
        });

        in_flight.push(Submission {
            index,
            release,
            thread,
        });
        index
    }

    /// Wait for `index` and every submission before it, then signal the
    /// monitor's flush barrier.
    pub fn wait(&self, index: SubmissionIndex) {
        self.wait_where(|i| i <= index);
    }

    /// Wait for all submitted work, then signal the monitor's flush barrier.
    pub fn wait_idle(&self) {
        self.wait_where(|_| true);
    }

    /// Number of submissions that have not been waited on.
    pub fn in_flight(&self) -> usize {
        self.in_flight.lock().len()
    }

    fn wait_where(&self, filter: impl Fn(SubmissionIndex) -> bool) {
        let done: Vec<Submission> = {
            let mut in_flight = self.in_flight.lock();
            let (done, rest): (Vec<_>, Vec<_>) = mem::take(&mut *in_flight)
                .into_iter()
                .partition(|submission| filter(submission.index));
            *in_flight = rest;
            done
        };

        // Released one at a time so diagnostics arrive in submission order.
        for submission in done {
            let _ = submission.release.send(());
            if submission.thread.join().is_err() {
                log::error!("Submission {:?} panicked", submission.index);
            }
        }

        if let Some(generation) = self.sink.signal_flush() {
            log::trace!("Device work flushed, barrier generation {generation}");
        }
    }
}

impl fmt::Debug for SimulatedLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulatedLayer")
            .field("sink", &self.sink)
            .field("recorded", &self.recording.lock().len())
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

impl Drop for SimulatedLayer {
    fn drop(&mut self) {
        for Submission { release, thread, .. } in self.in_flight.get_mut().drain(..) {
            drop(release);
            let _ = thread.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use valmon_core::ErrorMonitor;

    use super::*;

    #[test]
    fn concurrent_submissions_stay_in_index_order() {
        let monitor = ErrorMonitor::default();
        let layer = SimulatedLayer::new(monitor.sink());

        thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..16 {
                        layer.submit();
                    }
                });
            }
        });

        let indices: Vec<SubmissionIndex> =
            layer.in_flight.lock().iter().map(|s| s.index).collect();
        assert_eq!(indices.len(), 64);
        assert!(indices.windows(2).all(|w| w[0] < w[1]));

        layer.wait_idle();
        assert_eq!(monitor.finish(), Ok(()));
    }
}
