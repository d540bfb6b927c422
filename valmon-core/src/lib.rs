/*! Verification of validation-layer diagnostics against declared expectations.
 *
 *  A test registers the diagnostics it expects on an [`ErrorMonitor`], drives
 *  the layer under test, and closes the assertion scope with
 *  [`ErrorMonitor::verify_found`]. The layer reports through a [`Sink`], from
 *  any thread; diagnostics produced by device work become visible only after
 *  the caller waited for that work and signalled the [`FlushBarrier`].
 */

#![allow(
    // It is much clearer to assert negative conditions with eq! false
    clippy::bool_assert_comparison,
    // We don't use syntax sugar where it's not necessary.
    clippy::match_like_matches_macro,
    // No need for defaults in the internal types.
    clippy::new_without_default,
)]
#![warn(
    trivial_casts,
    trivial_numeric_casts,
    unsafe_op_in_unsafe_fn,
    unused_extern_crates,
    unused_qualifications,
    // We don't match on a reference, unless required.
    clippy::pattern_type_mismatch,
)]

mod barrier;
pub mod config;
pub mod error;
pub mod expectation;
mod message;
mod monitor;
pub mod registry;
mod sink;

pub use barrier::FlushBarrier;
pub use config::{ConfigError, MonitorConfig};
pub use error::{FailureKind, MonitorFailure, MonitorFailures, UnexpectedHint};
pub use expectation::{Disposition, Expectation, ExpectationDescriptor, Timeline};
pub use message::{Message, Severity, SeverityFlags};
pub use monitor::{ErrorMonitor, ScopeVerdict};
pub use registry::{ExpectationRegistry, MatchOutcome, PendingExpectation, RegistryError};
pub use sink::{CallbackAction, Sink};
