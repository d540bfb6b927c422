use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Message, SeverityFlags};

/// How an unsatisfied expectation is treated when its scope is verified.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Disposition {
    /// Must be matched `required_count` times before the scope is verified.
    Required,
    /// May or may not appear, usually because of driver or platform variance.
    Allowed,
    /// A known message that is tolerated without being required.
    Unexpected,
}

impl Disposition {
    pub fn is_required(self) -> bool {
        self == Self::Required
    }
}

/// Which execution timeline is expected to produce a diagnostic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Timeline {
    /// Reported inline while the triggering API call runs.
    #[default]
    Host,
    /// Written by instrumented device work; only visible after a wait.
    Device,
}

/// A declared match target in an assertion scope.
#[derive(Clone, Debug)]
pub struct Expectation {
    pub(crate) pattern: String,
    pub(crate) disposition: Disposition,
    pub(crate) required_count: u32,
    pub(crate) matched_count: u32,
    pub(crate) severities: SeverityFlags,
    pub(crate) timeline: Timeline,
    pub(crate) armed_at: u64,
}

impl Expectation {
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn disposition(&self) -> Disposition {
        self.disposition
    }

    pub fn required_count(&self) -> u32 {
        self.required_count
    }

    pub fn matched_count(&self) -> u32 {
        self.matched_count
    }

    pub fn severities(&self) -> SeverityFlags {
        self.severities
    }

    pub fn timeline(&self) -> Timeline {
        self.timeline
    }

    /// Flush barrier generation observed when this expectation was registered.
    pub fn armed_at(&self) -> u64 {
        self.armed_at
    }

    pub fn is_satisfied(&self) -> bool {
        self.matched_count >= self.required_count
    }

    pub fn missing(&self) -> u32 {
        self.required_count - self.matched_count
    }

    /// Text and severity match, ignoring how many times this was consumed.
    pub(crate) fn matches(&self, message: &Message) -> bool {
        self.severities.contains(message.severity().into()) && message.contains(&self.pattern)
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\"{}\" ({:?}, {}/{})",
            self.pattern, self.disposition, self.matched_count, self.required_count
        )
    }
}

/// Parameters for a new [`Expectation`].
///
/// Built by the [`ErrorMonitor`](crate::ErrorMonitor) declaration calls and
/// handed to [`ExpectationRegistry::add`](crate::ExpectationRegistry::add).
#[derive(Clone, Debug)]
pub struct ExpectationDescriptor<'a> {
    pub pattern: &'a str,
    pub count: u32,
    pub disposition: Disposition,
    pub severities: SeverityFlags,
    pub timeline: Timeline,
}

impl<'a> ExpectationDescriptor<'a> {
    pub fn new(pattern: &'a str) -> Self {
        Self {
            pattern,
            count: 1,
            disposition: Disposition::Required,
            severities: SeverityFlags::all(),
            timeline: Timeline::Host,
        }
    }

    pub fn with_disposition(self, disposition: Disposition) -> Self {
        Self {
            disposition,
            ..self
        }
    }

    pub fn with_count(self, count: u32) -> Self {
        Self { count, ..self }
    }

    pub fn with_severities(self, severities: SeverityFlags) -> Self {
        Self { severities, ..self }
    }

    pub fn with_timeline(self, timeline: Timeline) -> Self {
        Self { timeline, ..self }
    }
}
