use std::{error::Error, fmt};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{registry::PendingExpectation, Message};

/// What the monitor suggests the author was expecting instead of an
/// unexpected diagnostic.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum UnexpectedHint {
    /// The message matches a pattern that already reached its count.
    AlreadySatisfied { pattern: String, count: u32 },
    /// Required patterns still pending in the scope.
    Pending(Vec<String>),
    /// Nothing was registered in the scope.
    Nothing,
}

impl fmt::Display for UnexpectedHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::AlreadySatisfied {
                ref pattern,
                count,
            } => write!(
                f,
                "extra occurrence of {pattern:?}, which was expected {count} time(s)"
            ),
            Self::Pending(ref patterns) => {
                f.write_str("expected instead: ")?;
                for (i, pattern) in patterns.iter().enumerate() {
                    if i != 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{pattern:?}")?;
                }
                Ok(())
            }
            Self::Nothing => f.write_str("no diagnostics were expected"),
        }
    }
}

struct PendingList<'a>(&'a [PendingExpectation]);

impl fmt::Display for PendingList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for p in self.0 {
            write!(
                f,
                "\n    {:?} (missing {} of {})",
                p.pattern, p.missing, p.required
            )?;
            if p.device_wait_missing {
                f.write_str("; no device wait observed since this expectation was registered")?;
            }
        }
        Ok(())
    }
}

/// One way an assertion scope went wrong.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FailureKind {
    #[error("expected diagnostics were not reported:{}", PendingList(.pending))]
    MissingDiagnostic { pending: Vec<PendingExpectation> },
    #[error("unexpected {}\n    {hint}", .message)]
    UnexpectedDiagnostic {
        message: Message,
        hint: UnexpectedHint,
    },
    #[error("diagnostic {pattern:?} was reported {seen} time(s) but must not occur")]
    ForbiddenDiagnostic { pattern: String, seen: u32 },
    #[error("expectations were registered but never verified:{}", PendingList(.pending))]
    UnverifiedExpectations { pending: Vec<PendingExpectation> },
}

/// A failure recorded by the monitor, tied to the assertion scope it was
/// raised in.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[error("[scope {scope}] {kind}")]
pub struct MonitorFailure {
    pub scope: u64,
    pub kind: FailureKind,
}

/// Every failure recorded over the lifetime of a monitor.
///
/// Returned by [`ErrorMonitor::finish`](crate::ErrorMonitor::finish).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MonitorFailures(pub Vec<MonitorFailure>);

impl MonitorFailures {
    pub fn iter(&self) -> impl Iterator<Item = &MonitorFailure> + '_ {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for MonitorFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation monitor failure(s)", self.0.len())?;
        for failure in &self.0 {
            write!(f, "\n\n{failure}")?;
        }
        Ok(())
    }
}

impl Error for MonitorFailures {}
