use std::{borrow::Cow, fmt};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Severity of a diagnostic emitted by the layer under test.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Severity {
    /// Informational chatter.
    Info = 0,
    /// Suspicious but legal usage.
    Warning = 1,
    /// A violated usage rule.
    Error = 2,
    /// Legal usage with a known performance cost.
    PerformanceWarning = 3,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::PerformanceWarning => "performance warning",
        }
    }

    /// The `log` level diagnostics of this severity are echoed at.
    pub fn log_level(self) -> log::Level {
        match self {
            Self::Error => log::Level::Error,
            Self::Warning => log::Level::Warn,
            Self::PerformanceWarning => log::Level::Info,
            Self::Info => log::Level::Debug,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags::bitflags! {
    /// A set of [`Severity`] values.
    ///
    /// Used both to narrow which messages an expectation may match and to
    /// select which unmatched messages count as test failures.
    #[repr(transparent)]
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct SeverityFlags: u8 {
        const INFO = 1 << Severity::Info as u8;
        const WARNING = 1 << Severity::Warning as u8;
        const ERROR = 1 << Severity::Error as u8;
        const PERFORMANCE_WARNING = 1 << Severity::PerformanceWarning as u8;
    }
}

impl SeverityFlags {
    /// The severities whose unmatched occurrences fail a test by default.
    pub const STRICT_DEFAULT: Self = Self::ERROR.union(Self::WARNING);
}

impl Default for SeverityFlags {
    fn default() -> Self {
        Self::STRICT_DEFAULT
    }
}

impl From<Severity> for SeverityFlags {
    fn from(severity: Severity) -> Self {
        Self::from_bits_truncate(1 << severity as u8)
    }
}

/// One diagnostic reported by the layer under test.
///
/// Messages are immutable once built by a sink adapter. The registry only ever
/// reads them; an unmatched message is kept verbatim in the failure log.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Message {
    severity: Severity,
    text: Cow<'static, str>,
}

impl Message {
    pub fn new(severity: Severity, text: impl Into<Cow<'static, str>>) -> Self {
        Self {
            severity,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<Cow<'static, str>>) -> Self {
        Self::new(Severity::Error, text)
    }

    pub fn warning(text: impl Into<Cow<'static, str>>) -> Self {
        Self::new(Severity::Warning, text)
    }

    pub fn info(text: impl Into<Cow<'static, str>>) -> Self {
        Self::new(Severity::Info, text)
    }

    pub fn performance_warning(text: impl Into<Cow<'static, str>>) -> Self {
        Self::new(Severity::PerformanceWarning, text)
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns true if `pattern` occurs in the message text.
    ///
    /// The comparison is a case-sensitive substring search.
    pub fn contains(&self, pattern: &str) -> bool {
        self.text.contains(pattern)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_flags_from_severity() {
        assert_eq!(SeverityFlags::from(Severity::Info), SeverityFlags::INFO);
        assert_eq!(
            SeverityFlags::from(Severity::PerformanceWarning),
            SeverityFlags::PERFORMANCE_WARNING
        );
        assert!(SeverityFlags::default().contains(Severity::Error.into()));
        assert!(SeverityFlags::default().contains(Severity::Warning.into()));
        assert!(!SeverityFlags::default().contains(Severity::Info.into()));
    }

    #[test]
    fn substring_is_case_sensitive() {
        let msg = Message::error("Validation Error: [ VUID-vkCmdDraw-None-02859 ] bad");
        assert!(msg.contains("VUID-vkCmdDraw-None-02859"));
        assert!(!msg.contains("vuid-vkcmddraw-none-02859"));
        assert_eq!(
            msg.to_string(),
            "error: Validation Error: [ VUID-vkCmdDraw-None-02859 ] bad"
        );
    }
}
