//! Pending expectations for one assertion scope, and the matcher over them.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    expectation::{Disposition, Expectation, ExpectationDescriptor},
    Message,
};

/// Misuse of the declaration API.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum RegistryError {
    #[error("expectation pattern must not be empty")]
    EmptyPattern,
    #[error("expectation {pattern:?} must require at least one occurrence")]
    ZeroCount { pattern: String },
}

/// Result of offering a message to the registry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MatchOutcome {
    /// The message was assigned to an expectation with this disposition.
    Consumed(Disposition),
    /// Only already satisfied expectations match the message.
    ///
    /// This is an extra occurrence of `pattern`, which was declared for
    /// `count` occurrences.
    Exhausted { pattern: String, count: u32 },
    /// Nothing registered matches the message.
    Unmatched,
}

impl MatchOutcome {
    pub fn is_consumed(&self) -> bool {
        matches!(*self, Self::Consumed(_))
    }
}

/// A required expectation that has not reached its count yet.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PendingExpectation {
    pub pattern: String,
    pub missing: u32,
    pub required: u32,
    /// Expected from the device timeline, but no wait was signalled on the
    /// flush barrier since it was registered.
    pub device_wait_missing: bool,
}

/// Insertion-ordered bag of expectations for the active assertion scope.
///
/// Satisfied expectations stay in the bag until [`reset`](Self::reset), so an
/// extra occurrence of a fully matched pattern can be reported as such.
#[derive(Debug, Default)]
pub struct ExpectationRegistry {
    entries: SmallVec<[Expectation; 4]>,
}

impl ExpectationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &mut self,
        desc: &ExpectationDescriptor<'_>,
        armed_at: u64,
    ) -> Result<(), RegistryError> {
        if desc.pattern.is_empty() {
            return Err(RegistryError::EmptyPattern);
        }
        if desc.count == 0 {
            return Err(RegistryError::ZeroCount {
                pattern: desc.pattern.to_string(),
            });
        }

        log::trace!(
            "Expecting {:?} x{} ({:?})",
            desc.pattern,
            desc.count,
            desc.disposition
        );
        self.entries.push(Expectation {
            pattern: desc.pattern.to_string(),
            disposition: desc.disposition,
            required_count: desc.count,
            matched_count: 0,
            severities: desc.severities,
            timeline: desc.timeline,
            armed_at,
        });
        Ok(())
    }

    /// Shorthand for adding an expectation that matches any severity.
    pub fn add_expectation(
        &mut self,
        pattern: &str,
        count: u32,
        disposition: Disposition,
    ) -> Result<(), RegistryError> {
        let desc = ExpectationDescriptor::new(pattern)
            .with_count(count)
            .with_disposition(disposition);
        self.add(&desc, 0)
    }

    /// Assigns `message` to the first registered expectation that still needs
    /// occurrences and matches it.
    pub fn try_consume(&mut self, message: &Message) -> MatchOutcome {
        let mut exhausted = None;
        for entry in self.entries.iter_mut() {
            if !entry.matches(message) {
                continue;
            }
            if entry.is_satisfied() {
                exhausted.get_or_insert_with(|| (entry.pattern.clone(), entry.required_count));
                continue;
            }

            entry.matched_count += 1;
            log::trace!("Matched {} against {:?}", entry, message.text());
            return MatchOutcome::Consumed(entry.disposition);
        }

        match exhausted {
            Some((pattern, count)) => MatchOutcome::Exhausted { pattern, count },
            None => MatchOutcome::Unmatched,
        }
    }

    pub fn all_required_satisfied(&self) -> bool {
        self.entries
            .iter()
            .filter(|e| e.disposition.is_required())
            .all(Expectation::is_satisfied)
    }

    /// Unsatisfied required expectations, in registration order.
    pub fn pending_required(&self) -> impl Iterator<Item = &Expectation> + '_ {
        self.entries
            .iter()
            .filter(|e| e.disposition.is_required() && !e.is_satisfied())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Expectation> + '_ {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }
}

impl From<&Expectation> for PendingExpectation {
    fn from(e: &Expectation) -> Self {
        Self {
            pattern: e.pattern.clone(),
            missing: e.missing(),
            required: e.required_count,
            device_wait_missing: false,
        }
    }
}
