use std::sync::atomic::{AtomicU64, Ordering};

/// Generation counter for waits that make device-timeline diagnostics visible.
///
/// Diagnostics produced by instrumented shaders are only written back to the
/// host once the submission that ran them has completed and been waited on.
/// The monitor cannot observe that wait itself, so whoever performs it calls
/// [`signal`](Self::signal) afterwards. Nothing here blocks: the counter is
/// only used to explain a missing device-timeline diagnostic.
#[derive(Debug, Default)]
pub struct FlushBarrier {
    generation: AtomicU64,
}

impl FlushBarrier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that all previously submitted device work has been waited on.
    ///
    /// Returns the new generation.
    pub fn signal(&self) -> u64 {
        // Release pairs with the acquire in `generation`, so diagnostics
        // delivered before the signal are ordered before any reader of it.
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        log::trace!("Flush barrier advanced to generation {generation}");
        generation
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Returns true if a wait was signalled after `generation` was observed.
    pub fn flushed_since(&self, generation: u64) -> bool {
        self.generation() > generation
    }
}
