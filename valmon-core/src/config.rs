use thiserror::Error;

use crate::SeverityFlags;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown severity {0:?}, expected one of: error, warning, info, perf")]
    UnknownSeverity(String),
    #[error("invalid switch {0:?}, expected one of: 1, 0, true, false, yes, no, on, off")]
    InvalidSwitch(String),
}

/// Behavior of an [`ErrorMonitor`](crate::ErrorMonitor).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Severities whose unmatched diagnostics fail the test.
    ///
    /// Anything outside this set is dropped unless an expectation asks for it.
    pub strict: SeverityFlags,
    /// Echo every diagnostic through `log` at a level matching its severity.
    pub log_messages: bool,
    /// Ask the native callback to skip the offending call once a required
    /// diagnostic matched.
    pub bailout: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            strict: SeverityFlags::STRICT_DEFAULT,
            log_messages: true,
            bailout: false,
        }
    }
}

impl MonitorConfig {
    /// Override fields from the `VALMON_STRICT`, `VALMON_LOG_MESSAGES` and
    /// `VALMON_BAILOUT` environment variables.
    ///
    /// Variables that are unset keep the current value. A variable that fails
    /// to parse is logged and ignored.
    pub fn with_env(self) -> Self {
        self.with_vars(|name| std::env::var(name).ok())
    }

    /// Like [`with_env`](Self::with_env), reading variables through `lookup`.
    pub fn with_vars(self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            strict: parsed_var(
                &lookup,
                "VALMON_STRICT",
                parse_severities_from_comma_list,
                self.strict,
            ),
            log_messages: parsed_var(
                &lookup,
                "VALMON_LOG_MESSAGES",
                parse_switch,
                self.log_messages,
            ),
            bailout: parsed_var(&lookup, "VALMON_BAILOUT", parse_switch, self.bailout),
        }
    }
}

fn parsed_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    parse: impl Fn(&str) -> Result<T, ConfigError>,
    current: T,
) -> T {
    match lookup(name).as_deref().map(parse) {
        Some(Ok(value)) => value,
        Some(Err(err)) => {
            log::warn!("Ignoring {name}: {err}");
            current
        }
        None => current,
    }
}

/// Parse a comma separated list of severities, such as `"error, warning"`.
///
/// Names are case-insensitive. An empty list yields no severities.
pub fn parse_severities_from_comma_list(string: &str) -> Result<SeverityFlags, ConfigError> {
    let mut severities = SeverityFlags::empty();
    for name in string.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        severities |= match name.to_lowercase().as_str() {
            "error" | "errors" => SeverityFlags::ERROR,
            "warning" | "warn" | "warnings" => SeverityFlags::WARNING,
            "info" => SeverityFlags::INFO,
            "perf" | "performance" => SeverityFlags::PERFORMANCE_WARNING,
            "all" => SeverityFlags::all(),
            _ => return Err(ConfigError::UnknownSeverity(name.to_string())),
        };
    }
    Ok(severities)
}

/// Parse an on/off switch such as `VALMON_BAILOUT=1`. Case-insensitive.
pub fn parse_switch(value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidSwitch(value.to_string())),
    }
}
